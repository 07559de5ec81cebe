pub mod cpu_frame_compositor;
mod gaussian;
mod pixelate;
