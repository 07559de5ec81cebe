use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Applies every region active at `frame_index` to a copy of `frame`.
///
/// Regions are applied in slice order, each one reading the output of the
/// previous ones, so later regions paint over earlier ones where they
/// overlap. A region that cannot be applied is skipped; it never aborts
/// the frame.
pub trait FrameCompositor: Send {
    fn composite(&self, frame: &Frame, frame_index: usize, regions: &[Region]) -> Frame;
}
