use std::path::PathBuf;

/// Stream properties reported by a [`VideoSource`](crate::video::domain::video_source::VideoSource).
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    pub fn duration_seconds(&self) -> f64 {
        if self.fps > 0.0 {
            self.total_frames as f64 / self.fps
        } else {
            0.0
        }
    }
}

/// Summary handed to the authoring layer when a video is loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    pub fps: f64,
    pub frame_count: usize,
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
}

impl VideoInfo {
    pub fn from_metadata(metadata: &VideoMetadata, size_bytes: u64) -> Self {
        Self {
            fps: metadata.fps,
            frame_count: metadata.total_frames,
            duration_seconds: metadata.duration_seconds(),
            width: metadata.width,
            height: metadata.height,
            size_bytes,
        }
    }
}

/// Maps a playback position to a frame index: `floor(second * fps)`.
///
/// There is no timestamp-based seeking anywhere in the engine, so this
/// is only exact for sources with a constant, integral frame rate. With
/// fractional rates (e.g. 29.97) positions drift by up to one frame
/// relative to the container's presentation timestamps.
pub fn frame_index_at(second: f64, fps: f64) -> usize {
    if !(second.is_finite() && fps.is_finite()) || second <= 0.0 || fps <= 0.0 {
        return 0;
    }
    (second * fps).floor() as usize
}

/// Inverse of [`frame_index_at`], in whole seconds.
pub fn second_at(frame_index: usize, fps: f64) -> usize {
    if fps <= 0.0 {
        return 0;
    }
    (frame_index as f64 / fps).floor() as usize
}
