use crate::shared::constants::{
    DEFAULT_MAX_WIDTH, FALLBACK_FPS, HIGH_QUALITY_TARGET_FRAMES, LOW_QUALITY_TARGET_FRAMES,
};

/// Named target frame counts for animated export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnimationQuality {
    #[default]
    High,
    Low,
}

impl AnimationQuality {
    pub fn target_frames(self) -> usize {
        match self {
            AnimationQuality::High => HIGH_QUALITY_TARGET_FRAMES,
            AnimationQuality::Low => LOW_QUALITY_TARGET_FRAMES,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "high" => Some(AnimationQuality::High),
            "low" => Some(AnimationQuality::Low),
            _ => None,
        }
    }
}

/// Which source frames go into an animation, how long each is shown and
/// at what size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingPlan {
    pub frame_skip: usize,
    pub frame_delay_ms: u32,
    pub width: u32,
    pub height: u32,
}

impl SamplingPlan {
    /// `frame_skip = max(1, total / target)`; delay is
    /// `round(1000 / (fps / frame_skip))` milliseconds.
    pub fn new(
        total_frames: usize,
        target_frames: usize,
        fps: f64,
        source_size: (u32, u32),
        max_width: u32,
    ) -> Self {
        let frame_skip = (total_frames / target_frames.max(1)).max(1);
        let fps = if fps > 0.0 { fps } else { FALLBACK_FPS as f64 };
        let frame_delay_ms = (1000.0 / (fps / frame_skip as f64)).round() as u32;
        let (width, height) = output_size(source_size.0, source_size.1, max_width);
        Self {
            frame_skip,
            frame_delay_ms,
            width,
            height,
        }
    }

    pub fn keeps(&self, frame_index: usize) -> bool {
        frame_index % self.frame_skip == 0
    }

    /// Number of frames a stream of `total_frames` yields under this plan.
    pub fn sampled_count(&self, total_frames: usize) -> usize {
        total_frames.div_ceil(self.frame_skip)
    }
}

/// Scales down to `max_width` keeping the aspect ratio. Narrower frames
/// keep their size.
pub fn output_size(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    let max_width = if max_width == 0 {
        DEFAULT_MAX_WIDTH
    } else {
        max_width
    };
    if width <= max_width || width == 0 {
        return (width, height);
    }
    let scaled = (height as u64 * max_width as u64 / width as u64).max(1) as u32;
    (max_width, scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_150_frames_target_15_keeps_every_tenth() {
        let plan = SamplingPlan::new(150, 15, 30.0, (720, 480), 800);
        assert_eq!(plan.frame_skip, 10);
        let kept: Vec<usize> = (0..150).filter(|&i| plan.keeps(i)).collect();
        assert_eq!(kept, (0..15).map(|i| i * 10).collect::<Vec<_>>());
        assert_eq!(plan.sampled_count(150), 15);
    }

    #[rstest]
    #[case(150, 15, 30.0, 333)]
    #[case(60, 60, 30.0, 33)]
    #[case(10, 60, 24.0, 42)]
    #[case(300, 60, 25.0, 200)]
    #[case(100, 10, 0.0, 333)]
    fn test_frame_delay(
        #[case] total: usize,
        #[case] target: usize,
        #[case] fps: f64,
        #[case] delay: u32,
    ) {
        let plan = SamplingPlan::new(total, target, fps, (100, 100), 800);
        assert_eq!(plan.frame_delay_ms, delay);
    }

    #[test]
    fn test_short_video_keeps_every_frame() {
        let plan = SamplingPlan::new(10, 60, 30.0, (100, 100), 800);
        assert_eq!(plan.frame_skip, 1);
        assert_eq!(plan.sampled_count(10), 10);
    }

    #[test]
    fn test_zero_target_does_not_divide_by_zero() {
        let plan = SamplingPlan::new(90, 0, 30.0, (100, 100), 800);
        assert_eq!(plan.frame_skip, 90);
    }

    #[rstest]
    #[case((1920, 1080), 800, (800, 450))]
    #[case((720, 480), 800, (720, 480))]
    #[case((1000, 333), 500, (500, 166))]
    #[case((4000, 1), 800, (800, 1))]
    #[case((1600, 900), 0, (800, 450))]
    fn test_output_size(
        #[case] source: (u32, u32),
        #[case] max_width: u32,
        #[case] expected: (u32, u32),
    ) {
        assert_eq!(output_size(source.0, source.1, max_width), expected);
    }

    #[test]
    fn test_quality_presets() {
        assert_eq!(AnimationQuality::High.target_frames(), 60);
        assert_eq!(AnimationQuality::Low.target_frames(), 15);
        assert_eq!(AnimationQuality::parse("LOW"), Some(AnimationQuality::Low));
        assert_eq!(AnimationQuality::parse("medium"), None);
        assert_eq!(AnimationQuality::default(), AnimationQuality::High);
    }
}
