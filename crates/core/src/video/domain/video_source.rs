use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Sequential frame access to a video file.
///
/// Frame indices are decode-order positions starting at 0. There is no
/// timestamp seeking; [`VideoSource::seek_to_frame`] positions the source
/// so that the next [`VideoSource::read_next`] yields the requested index,
/// or end of stream when the index is past the last frame.
pub trait VideoSource: Send {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    fn seek_to_frame(&mut self, index: usize) -> Result<(), Box<dyn std::error::Error>>;

    /// Returns `Ok(None)` at end of stream.
    fn read_next(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    fn close(&mut self);
}
