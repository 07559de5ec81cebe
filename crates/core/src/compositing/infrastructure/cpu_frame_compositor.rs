use ndarray::{Array3, Zip};

use crate::compositing::domain::frame_compositor::FrameCompositor;
use crate::compositing::domain::strength_curve::{Blend, StrengthCurve};
use crate::shared::error::RegionError;
use crate::shared::frame::Frame;
use crate::shared::region::{Algorithm, Region};

use super::{gaussian, pixelate};

/// Software compositor: clip, transform, blend, one region at a time.
pub struct CpuFrameCompositor {
    curve: StrengthCurve,
}

impl CpuFrameCompositor {
    pub fn new(curve: StrengthCurve) -> Self {
        Self { curve }
    }

    /// Applies one region to `frame` in place, regardless of its temporal range.
    pub fn apply_region(&self, frame: &mut Frame, region: &Region) -> Result<(), RegionError> {
        if frame.is_empty() {
            return Err(RegionError::EmptyFrame {
                width: frame.width(),
                height: frame.height(),
            });
        }
        let degenerate = || RegionError::DegenerateRoi {
            x: region.rect.x,
            y: region.rect.y,
            width: region.rect.width,
            height: region.rect.height,
        };

        let clipped = region
            .rect
            .clip_to(frame.width(), frame.height())
            .ok_or_else(degenerate)?;
        let original = frame.crop(clipped).ok_or_else(degenerate)?;

        let opacity = region.opacity();
        let transformed = self.transform(&original, region.algorithm, opacity)?;
        if transformed.dim() != original.dim() {
            return Err(RegionError::ShapeMismatch {
                expected: original.len(),
                actual: transformed.len(),
            });
        }

        let mut target = frame.roi_mut(clipped).ok_or_else(degenerate)?;
        match self.curve.blend(opacity) {
            Blend::Replace => target.assign(&transformed),
            Blend::Mix(weight) => {
                let keep = 1.0 - weight;
                Zip::from(&mut target)
                    .and(&original)
                    .and(&transformed)
                    .for_each(|dst, &orig, &fx| {
                        let v = orig as f64 * keep + fx as f64 * weight;
                        *dst = v.round().clamp(0.0, 255.0) as u8;
                    });
            }
        }

        log::debug!(
            "Applied {} at {:?} (opacity {:.2}) to frame {}",
            region.algorithm,
            clipped,
            opacity,
            frame.index()
        );
        Ok(())
    }

    fn transform(
        &self,
        roi: &Array3<u8>,
        algorithm: Algorithm,
        opacity: f64,
    ) -> Result<Array3<u8>, RegionError> {
        match algorithm {
            Algorithm::GaussianBlur => gaussian::blur_passes(
                roi,
                self.curve.kernel_size(opacity),
                self.curve.blur_passes(opacity),
            ),
            Algorithm::Pixelate => pixelate::pixelate(roi, self.curve.block_size(opacity)),
            Algorithm::SolidFillBlack => Ok(Array3::zeros(roi.raw_dim())),
            Algorithm::SolidFillWhite => Ok(Array3::from_elem(roi.raw_dim(), 255)),
        }
    }
}

impl Default for CpuFrameCompositor {
    fn default() -> Self {
        Self::new(StrengthCurve::default())
    }
}

impl FrameCompositor for CpuFrameCompositor {
    fn composite(&self, frame: &Frame, frame_index: usize, regions: &[Region]) -> Frame {
        let mut out = frame.clone();
        for (i, region) in regions.iter().enumerate() {
            if !region.is_active_at(frame_index) {
                continue;
            }
            if let Err(e) = self.apply_region(&mut out, region) {
                log::warn!("Skipping region #{i} on frame {frame_index}: {e}");
            }
        }
        out
    }
}
