use std::path::Path;

use crate::animation::animated_exporter::AnimatedExporter;
use crate::animation::sampling_plan::SamplingPlan;
use crate::compositing::domain::frame_compositor::FrameCompositor;
use crate::shared::error::EngineError;
use crate::shared::region::Region;
use crate::video::domain::video_source::VideoSource;

/// Samples a video into a looping animation of composited frames.
///
/// Frames the sampling plan drops are decoded but never composited.
pub struct ExportAnimationUseCase {
    source: Box<dyn VideoSource>,
    compositor: Box<dyn FrameCompositor>,
    exporter: AnimatedExporter,
}

impl ExportAnimationUseCase {
    pub fn new(
        source: Box<dyn VideoSource>,
        compositor: Box<dyn FrameCompositor>,
        exporter: AnimatedExporter,
    ) -> Self {
        Self {
            source,
            compositor,
            exporter,
        }
    }

    /// Returns the number of frames in the written animation.
    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
        regions: &[Region],
        target_frames: usize,
        max_width: u32,
    ) -> Result<usize, EngineError> {
        let metadata = self
            .source
            .open(input_path)
            .map_err(|e| EngineError::SourceOpen {
                path: input_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let plan = SamplingPlan::new(
            metadata.total_frames,
            target_frames,
            metadata.fps,
            (metadata.width, metadata.height),
            max_width,
        );
        log::info!(
            "Sampling every {} of {} frames into {} (~{} frames)",
            plan.frame_skip,
            metadata.total_frames,
            output_path.display(),
            plan.sampled_count(metadata.total_frames)
        );

        let source = &mut self.source;
        let compositor = &self.compositor;
        let mut decoded = 0;
        let frames = std::iter::from_fn(|| match source.read_next() {
            Ok(Some(frame)) => {
                decoded += 1;
                Some(Ok(frame))
            }
            Ok(None) => None,
            Err(e) => Some(Err(EngineError::Decode {
                index: decoded,
                reason: e.to_string(),
            })),
        })
        .filter(|frame| match frame {
            Ok(frame) => plan.keeps(frame.index()),
            Err(_) => true,
        })
        .map(|frame| frame.map(|f| compositor.composite(&f, f.index(), regions)));

        let result = self.exporter.export(frames, &plan, output_path);
        self.source.close();
        result
    }
}
