//! Synthetic video fixtures shared by the test modules.

use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_sink::VideoSink;
use crate::video::infrastructure::ffmpeg_sink::FfmpegSink;

pub trait FramePattern {
    fn frame(&self, index: usize, width: u32, height: u32) -> Frame;
}

/// Flat grey frames that get brighter with the index.
pub struct SolidFrames;

impl FramePattern for SolidFrames {
    fn frame(&self, index: usize, width: u32, height: u32) -> Frame {
        Frame::filled(width, height, 20 + ((index * 20) % 200) as u8, index)
    }
}

/// Diagonal stripes that scroll with the index, so blurs are visible.
pub struct StripedFrames;

impl FramePattern for StripedFrames {
    fn frame(&self, index: usize, width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height as usize {
            for x in 0..width as usize {
                let band = ((x + y + index * 3) / 8) % 2;
                let v = if band == 0 { 30 } else { 220 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        Frame::new(data, width, height, index)
    }
}

pub fn test_metadata(width: u32, height: u32, fps: f64, total_frames: usize) -> VideoMetadata {
    VideoMetadata {
        width,
        height,
        fps,
        total_frames,
        codec: String::new(),
        source_path: None,
    }
}

/// Encodes `frames` frames of `pattern` to an MPEG-4 file at `path`.
pub fn write_test_video(
    path: &Path,
    frames: usize,
    width: u32,
    height: u32,
    fps: f64,
    pattern: &dyn FramePattern,
) {
    let mut sink = FfmpegSink::new();
    let metadata = test_metadata(width, height, fps, frames);
    sink.open(path, &metadata).unwrap();
    for i in 0..frames {
        sink.write_frame(&pattern.frame(i, width, height)).unwrap();
    }
    sink.close().unwrap();
}

pub fn mean_brightness(frame: &Frame) -> f64 {
    if frame.data().is_empty() {
        return 0.0;
    }
    frame.data().iter().map(|&v| v as f64).sum::<f64>() / frame.data().len() as f64
}
