use std::fs::{self, File};
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, RgbaImage};

use crate::shared::frame::Frame;
use crate::video::domain::animation_writer::AnimationWriter;

/// Palette quantization speed, 1 (best) to 30 (fastest).
const QUANTIZE_SPEED: i32 = 10;

/// Writes an infinitely looping GIF with the `image` crate's encoder.
///
/// Frames are held in memory and encoded in [`AnimationWriter::finish`],
/// which writes the whole file at once so a failed write is reported.
pub struct GifFileWriter {
    path: Option<PathBuf>,
    frames: Vec<image::Frame>,
}

impl GifFileWriter {
    pub fn new() -> Self {
        Self {
            path: None,
            frames: Vec::new(),
        }
    }

    fn encode(frames: Vec<image::Frame>) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let mut bytes = Vec::new();
        {
            let mut encoder = GifEncoder::new_with_speed(&mut bytes, QUANTIZE_SPEED);
            encoder.set_repeat(Repeat::Infinite)?;
            encoder.encode_frames(frames)?;
        }
        Ok(bytes)
    }
}

impl Default for GifFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationWriter for GifFileWriter {
    fn open(&mut self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        // Fail early on an unusable path, before any frame is decoded.
        File::create(path)?;
        self.path = Some(path.to_path_buf());
        self.frames.clear();
        Ok(())
    }

    fn write_frame(
        &mut self,
        frame: &Frame,
        delay_ms: u32,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.path.is_none() {
            return Err("GifFileWriter: not opened".into());
        }

        let rgba: Vec<u8> = frame
            .data()
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], u8::MAX])
            .collect();
        let buffer = RgbaImage::from_raw(frame.width(), frame.height(), rgba)
            .ok_or("frame buffer does not match its dimensions")?;

        let delay = Delay::from_numer_denom_ms(delay_ms, 1);
        self.frames.push(image::Frame::from_parts(buffer, 0, 0, delay));
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(path) = self.path.take() else {
            return Ok(());
        };
        let frames = std::mem::take(&mut self.frames);
        let count = frames.len();

        let bytes = Self::encode(frames)?;
        fs::write(&path, &bytes)?;
        log::debug!(
            "Finished GIF {} with {count} frames ({} bytes)",
            path.display(),
            bytes.len()
        );
        Ok(())
    }
}
