use std::path::Path;

use crate::animation::sampling_plan::SamplingPlan;
use crate::shared::error::EngineError;
use crate::shared::frame::Frame;
use crate::video::domain::animation_writer::AnimationWriter;

/// Samples a stream of composited frames into a looping animation.
pub struct AnimatedExporter {
    writer: Box<dyn AnimationWriter>,
}

impl AnimatedExporter {
    pub fn new(writer: Box<dyn AnimationWriter>) -> Self {
        Self { writer }
    }

    /// Writes every frame the plan keeps and returns how many were written.
    ///
    /// Frames are consumed lazily; an error from the stream stops the
    /// export and is returned as-is. Nothing is left at `path` when no
    /// frame was written.
    pub fn export<I>(
        &mut self,
        frames: I,
        plan: &SamplingPlan,
        path: &Path,
    ) -> Result<usize, EngineError>
    where
        I: IntoIterator<Item = Result<Frame, EngineError>>,
    {
        let write_error = |e: Box<dyn std::error::Error>| EngineError::AnimationWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        self.writer.open(path).map_err(write_error)?;

        let result = self.write_sampled(frames, plan, path);
        let finished = self.writer.finish().map_err(write_error);

        match (result, finished) {
            (Ok(0), Ok(())) => {
                remove_output(path);
                Err(EngineError::EmptyAnimation)
            }
            (Ok(count), Ok(())) => {
                log::info!(
                    "Wrote {} animation frames to {} ({}x{}, {} ms/frame)",
                    count,
                    path.display(),
                    plan.width,
                    plan.height,
                    plan.frame_delay_ms
                );
                Ok(count)
            }
            (Err(e), _) | (Ok(_), Err(e)) => {
                remove_output(path);
                Err(e)
            }
        }
    }

    fn write_sampled<I>(
        &mut self,
        frames: I,
        plan: &SamplingPlan,
        path: &Path,
    ) -> Result<usize, EngineError>
    where
        I: IntoIterator<Item = Result<Frame, EngineError>>,
    {
        let mut written = 0;
        for frame in frames {
            let frame = frame?;
            if !plan.keeps(frame.index()) {
                continue;
            }
            let scaled = fit_to_plan(frame, plan)?;
            self.writer
                .write_frame(&scaled, plan.frame_delay_ms)
                .map_err(|e| EngineError::AnimationWrite {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?;
            written += 1;
        }
        Ok(written)
    }
}

/// Resizes a frame to the plan's output size (bilinear), keeping its index.
fn fit_to_plan(frame: Frame, plan: &SamplingPlan) -> Result<Frame, EngineError> {
    if (frame.width(), frame.height()) == (plan.width, plan.height) {
        return Ok(frame);
    }
    let index = frame.index();
    let (width, height) = (frame.width(), frame.height());
    let img = image::RgbImage::from_raw(width, height, frame.into_data()).ok_or(
        EngineError::Decode {
            index,
            reason: format!("frame buffer does not match {width}x{height}"),
        },
    )?;
    let resized = image::imageops::resize(
        &img,
        plan.width,
        plan.height,
        image::imageops::FilterType::Triangle,
    );
    Ok(Frame::new(resized.into_raw(), plan.width, plan.height, index))
}

fn remove_output(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Could not remove {}: {e}", path.display());
        }
    }
}
