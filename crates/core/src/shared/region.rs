pub const MIN_INTENSITY: u8 = 10;
pub const MAX_INTENSITY: u8 = 100;

/// Axis-aligned rectangle in source-frame pixel coordinates.
///
/// Authored rectangles may extend past the frame; [`Rect::clip_to`]
/// produces the on-frame rectangle used for pixel work.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        self.width.max(0) as i64 * self.height.max(0) as i64
    }

    /// Intersects the rectangle with `[0, frame_width) x [0, frame_height)`.
    ///
    /// Returns `None` when nothing of the rectangle lies on the frame,
    /// including for an empty frame. Any returned side is at least one pixel.
    pub fn clip_to(&self, frame_width: u32, frame_height: u32) -> Option<Rect> {
        let (x, width) = clip_axis(self.x, self.width, frame_width)?;
        let (y, height) = clip_axis(self.y, self.height, frame_height)?;
        Some(Rect::new(x, y, width, height))
    }

    pub(crate) fn as_usize(&self) -> (usize, usize, usize, usize) {
        (
            self.x.max(0) as usize,
            self.y.max(0) as usize,
            self.width.max(0) as usize,
            self.height.max(0) as usize,
        )
    }
}

fn clip_axis(origin: i32, length: i32, limit: u32) -> Option<(i32, i32)> {
    if limit == 0 {
        return None;
    }
    let limit = limit.min(i32::MAX as u32) as i64;
    let start = (origin as i64).max(0);
    let end = (origin as i64 + length.max(0) as i64).min(limit);
    if end <= start {
        return None;
    }
    Some((start as i32, (end - start) as i32))
}

/// How a region is obscured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    GaussianBlur,
    Pixelate,
    SolidFillBlack,
    SolidFillWhite,
}

impl Algorithm {
    pub const ALL: &[Algorithm] = &[
        Algorithm::GaussianBlur,
        Algorithm::Pixelate,
        Algorithm::SolidFillBlack,
        Algorithm::SolidFillWhite,
    ];

    /// Name used in region files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::GaussianBlur => "gaussian",
            Algorithm::Pixelate => "pixelate",
            Algorithm::SolidFillBlack => "black_box",
            Algorithm::SolidFillWhite => "white_box",
        }
    }

    pub fn parse(name: &str) -> Option<Algorithm> {
        Self::ALL.iter().copied().find(|a| a.as_str() == name)
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper end of a temporal range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameBound {
    /// Inclusive last frame.
    Through(usize),
    /// Runs through the last frame of the video.
    Open,
}

/// Frame-index window during which a region is active.
///
/// Both ends are inclusive. Single-frame regions use `start == end`
/// (see [`TemporalRange::single`]); regions that last until the end of
/// the video use [`FrameBound::Open`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TemporalRange {
    pub start: usize,
    pub end: FrameBound,
}

impl TemporalRange {
    /// Builds a range, treating an end before `start` as open-ended.
    pub fn new(start: usize, end: FrameBound) -> Self {
        let end = match end {
            FrameBound::Through(e) if e < start => FrameBound::Open,
            other => other,
        };
        Self { start, end }
    }

    pub fn through(start: usize, end: usize) -> Self {
        Self::new(start, FrameBound::Through(end))
    }

    pub fn open(start: usize) -> Self {
        Self::new(start, FrameBound::Open)
    }

    pub fn single(frame: usize) -> Self {
        Self::through(frame, frame)
    }

    pub fn contains(&self, frame_index: usize) -> bool {
        if frame_index < self.start {
            return false;
        }
        match self.end {
            FrameBound::Open => true,
            FrameBound::Through(end) => frame_index <= end,
        }
    }
}

/// Clamps a stored intensity into the accepted `[10, 100]` range.
pub fn clamp_intensity(intensity: i64) -> u8 {
    intensity.clamp(MIN_INTENSITY as i64, MAX_INTENSITY as i64) as u8
}

/// Normalized opacity in `[0.1, 1.0]` for an intensity value.
pub fn opacity_for(intensity: u8) -> f64 {
    (clamp_intensity(intensity as i64) as f64 / 100.0).clamp(0.1, 1.0)
}

/// An authored obscuring instruction.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub rect: Rect,
    pub algorithm: Algorithm,
    pub intensity: u8,
    pub temporal_range: TemporalRange,
}

impl Region {
    pub fn new(
        rect: Rect,
        algorithm: Algorithm,
        intensity: u8,
        temporal_range: TemporalRange,
    ) -> Self {
        Self {
            rect,
            algorithm,
            intensity,
            temporal_range,
        }
    }

    pub fn is_active_at(&self, frame_index: usize) -> bool {
        self.temporal_range.contains(frame_index)
    }

    pub fn opacity(&self) -> f64 {
        opacity_for(self.intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    // --- Clipping ---

    #[test]
    fn test_clip_inside_frame_unchanged() {
        let r = Rect::new(100, 50, 200, 150);
        assert_eq!(r.clip_to(720, 480), Some(r));
    }

    #[test]
    fn test_clip_trims_right_and_bottom_overhang() {
        let r = Rect::new(700, 470, 100, 100);
        assert_eq!(r.clip_to(720, 480), Some(Rect::new(700, 470, 20, 10)));
    }

    #[test]
    fn test_clip_trims_negative_origin() {
        let r = Rect::new(-50, -20, 100, 60);
        assert_eq!(r.clip_to(720, 480), Some(Rect::new(0, 0, 50, 40)));
    }

    #[rstest]
    #[case::covers_frame(Rect::new(-10, -10, 500, 500))]
    #[case::left_overhang(Rect::new(-99, 10, 100, 100))]
    #[case::bottom_right_corner(Rect::new(63, 47, 100, 100))]
    #[case::huge(Rect::new(-1_000_000, -1_000_000, i32::MAX, i32::MAX))]
    fn test_clip_of_intersecting_rect_yields_at_least_one_pixel(#[case] r: Rect) {
        let c = r.clip_to(64, 48).unwrap();
        assert!(c.width >= 1 && c.height >= 1);
        assert!(c.x >= 0 && c.y >= 0);
        assert!(c.x + c.width <= 64);
        assert!(c.y + c.height <= 48);
    }

    #[rstest]
    #[case::left_of_frame(Rect::new(-300, 10, 100, 100))]
    #[case::touching_left_edge(Rect::new(-100, 10, 100, 100))]
    #[case::right_of_frame(Rect::new(5000, 10, 100, 100))]
    #[case::at_right_edge(Rect::new(64, 10, 100, 100))]
    #[case::above_frame(Rect::new(10, -900, 100, 100))]
    #[case::below_frame(Rect::new(10, 9000, 100, 100))]
    #[case::zero_size(Rect::new(10, 10, 0, 0))]
    #[case::negative_size(Rect::new(10, 10, -5, -5))]
    fn test_clip_off_frame_is_none(#[case] r: Rect) {
        assert_eq!(r.clip_to(64, 48), None);
    }

    #[test]
    fn test_clip_empty_frame_is_none() {
        assert!(Rect::new(0, 0, 10, 10).clip_to(0, 10).is_none());
    }

    // --- Temporal membership ---

    #[test]
    fn test_closed_range_is_inclusive_on_both_ends() {
        let range = TemporalRange::through(10, 20);
        assert!(!range.contains(9));
        for f in 10..=20 {
            assert!(range.contains(f), "frame {f} should be active");
        }
        assert!(!range.contains(21));
    }

    #[test]
    fn test_open_range_runs_to_end() {
        let range = TemporalRange::open(5);
        assert!(!range.contains(4));
        assert!((5..60).all(|f| range.contains(f)));
    }

    #[test]
    fn test_end_before_start_becomes_open() {
        let range = TemporalRange::through(30, 10);
        assert_eq!(range.end, FrameBound::Open);
        assert!(range.contains(1_000));
    }

    #[test]
    fn test_single_frame_range() {
        let range = TemporalRange::single(7);
        assert!(!range.contains(6));
        assert!(range.contains(7));
        assert!(!range.contains(8));
    }

    // --- Intensity ---

    #[rstest]
    #[case(-5, 10)]
    #[case(0, 10)]
    #[case(10, 10)]
    #[case(55, 55)]
    #[case(100, 100)]
    #[case(250, 100)]
    fn test_clamp_intensity(#[case] raw: i64, #[case] expected: u8) {
        assert_eq!(clamp_intensity(raw), expected);
    }

    #[test]
    fn test_opacity_range() {
        assert_relative_eq!(opacity_for(0), 0.1);
        assert_relative_eq!(opacity_for(90), 0.9);
        assert_relative_eq!(opacity_for(255), 1.0);
    }

    // --- Algorithm names ---

    #[test]
    fn test_algorithm_names_round_trip() {
        for a in Algorithm::ALL {
            assert_eq!(Algorithm::parse(a.as_str()), Some(*a));
        }
        assert_eq!(Algorithm::parse("blur"), None);
    }
}
