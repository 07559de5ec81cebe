use ndarray::{s, Array3, ArrayView3, ArrayViewMut3};

use crate::shared::region::Rect;

/// Bytes per pixel. Frames are always packed RGB24.
pub const CHANNELS: usize = 3;

/// A decoded video frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only. Compositing never
/// mutates a frame it was handed; it clones and mutates the copy, so a
/// frame held by a decode cursor is never observed half-composited.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// A frame filled with a single grey level.
    pub fn filled(width: u32, height: u32, value: u8, index: usize) -> Self {
        let len = (width as usize) * (height as usize) * CHANNELS;
        Self::new(vec![value; len], width, height, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn as_ndarray(&self) -> Option<ArrayView3<'_, u8>> {
        ArrayView3::from_shape(self.shape(), &self.data).ok()
    }

    pub fn as_ndarray_mut(&mut self) -> Option<ArrayViewMut3<'_, u8>> {
        let shape = self.shape();
        ArrayViewMut3::from_shape(shape, &mut self.data).ok()
    }

    /// Copies the pixels under `rect` into an owned `(h, w, 3)` array.
    ///
    /// `rect` must already be clipped to the frame.
    pub fn crop(&self, rect: Rect) -> Option<Array3<u8>> {
        let view = self.as_ndarray()?;
        let (x, y, w, h) = rect.as_usize();
        if x + w > self.width as usize || y + h > self.height as usize {
            return None;
        }
        Some(view.slice(s![y..y + h, x..x + w, ..]).to_owned())
    }

    /// A mutable view of the pixels under an already-clipped `rect`.
    pub fn roi_mut(&mut self, rect: Rect) -> Option<ArrayViewMut3<'_, u8>> {
        let (x, y, w, h) = rect.as_usize();
        if x + w > self.width as usize || y + h > self.height as usize {
            return None;
        }
        let view = self.as_ndarray_mut()?;
        Some(view.slice_move(s![y..y + h, x..x + w, ..]))
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12];
        let frame = Frame::new(data.clone(), 2, 2, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_clone_is_independent() {
        let frame = Frame::filled(2, 2, 100, 0);
        let mut cloned = frame.clone();
        cloned.data_mut()[0] = 0;
        assert_eq!(frame.data()[0], 100);
        assert_eq!(cloned.data()[0], 0);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 0);
    }

    #[test]
    fn test_as_ndarray_is_height_width_channels() {
        let frame = Frame::filled(4, 2, 0, 0);
        let arr = frame.as_ndarray().unwrap();
        assert_eq!(arr.shape(), &[2, 4, 3]);
    }

    #[test]
    fn test_crop_copies_the_requested_window() {
        let mut frame = Frame::filled(4, 4, 0, 0);
        // pixel (x=2, y=1)
        let idx = (4 + 2) * CHANNELS;
        frame.data_mut()[idx] = 200;
        let crop = frame.crop(Rect::new(2, 1, 2, 2)).unwrap();
        assert_eq!(crop.shape(), &[2, 2, 3]);
        assert_eq!(crop[[0, 0, 0]], 200);
        assert_eq!(crop[[1, 1, 0]], 0);
    }

    #[test]
    fn test_crop_outside_frame_is_none() {
        let frame = Frame::filled(4, 4, 0, 0);
        assert!(frame.crop(Rect::new(3, 3, 2, 2)).is_none());
    }

    #[test]
    fn test_roi_mut_writes_through() {
        let mut frame = Frame::filled(3, 3, 0, 0);
        frame.roi_mut(Rect::new(1, 1, 1, 1)).unwrap().fill(9);
        let arr = frame.as_ndarray().unwrap();
        assert_eq!(arr[[1, 1, 2]], 9);
        assert_eq!(arr[[0, 0, 0]], 0);
    }
}
