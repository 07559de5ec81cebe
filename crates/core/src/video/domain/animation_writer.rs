use std::path::Path;

use crate::shared::frame::Frame;

/// Streams frames into an infinitely looping animated image.
pub trait AnimationWriter: Send {
    fn open(&mut self, path: &Path) -> Result<(), Box<dyn std::error::Error>>;

    /// Appends a frame shown for `delay_ms` milliseconds.
    fn write_frame(&mut self, frame: &Frame, delay_ms: u32)
        -> Result<(), Box<dyn std::error::Error>>;

    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
