use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the engine's entry points.
///
/// Per-region problems are not represented here: they are recovered
/// inside the compositor (see [`RegionError`]).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("could not open video {path}: {reason}")]
    SourceOpen { path: PathBuf, reason: String },
    #[error("failed to decode frame {index}: {reason}")]
    Decode { index: usize, reason: String },
    #[error("frame {index} is past the end of the video ({frame_count} frames)")]
    FrameOutOfRange { index: usize, frame_count: usize },
    #[error("could not create output {path}: {reason}")]
    SinkOpen { path: PathBuf, reason: String },
    #[error("writing output failed after {frames_written} frames: {reason}")]
    SinkWrite {
        frames_written: usize,
        reason: String,
    },
    #[error("no frames were sampled for the animation")]
    EmptyAnimation,
    #[error("could not write animation to {path}: {reason}")]
    AnimationWrite { path: PathBuf, reason: String },
}

impl EngineError {
    /// Frames successfully written before the failure, where meaningful.
    pub fn frames_written(&self) -> usize {
        match self {
            EngineError::SinkWrite { frames_written, .. } => *frames_written,
            _ => 0,
        }
    }
}

/// A single region could not be applied to a frame.
#[derive(Error, Debug, PartialEq)]
pub enum RegionError {
    #[error("frame is empty ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("region {x},{y} {width}x{height} does not fit the frame after clipping")]
    DegenerateRoi {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    #[error("transform produced {actual} bytes, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
}

/// A region was rejected when added to a store.
#[derive(Error, Debug, PartialEq)]
pub enum RegionValidationError {
    #[error("region has zero area ({width}x{height})")]
    ZeroArea { width: i32, height: i32 },
    #[error("start frame {0} is negative")]
    NegativeStart(i64),
}

/// Reading or writing a region file failed.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("region file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("region file {path} is not valid: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown blur type {0:?}")]
    UnknownAlgorithm(String),
    #[error("region #{index} is invalid: {source}")]
    InvalidRegion {
        index: usize,
        #[source]
        source: RegionValidationError,
    },
}
