/// Animated exports never exceed this width unless the caller asks for more.
pub const DEFAULT_MAX_WIDTH: u32 = 800;

pub const HIGH_QUALITY_TARGET_FRAMES: usize = 60;
pub const LOW_QUALITY_TARGET_FRAMES: usize = 15;

/// Frame rate assumed when a container does not report one.
pub const FALLBACK_FPS: i32 = 30;

/// Export progress is logged once per this many frames.
pub const PROGRESS_LOG_INTERVAL: usize = 100;

/// Intensity used when a region file omits it.
pub const DEFAULT_INTENSITY: u8 = 90;

pub const DEFAULT_PII_TYPE: &str = "custom_text";

/// Sentinel used by region files for an open-ended range.
pub const OPEN_END_FRAME: i64 = -1;
