use std::path::Path;

use crate::compositing::domain::frame_compositor::FrameCompositor;
use crate::shared::constants::PROGRESS_LOG_INTERVAL;
use crate::shared::error::EngineError;
use crate::shared::region::Region;
use crate::video::domain::video_sink::VideoSink;
use crate::video::domain::video_source::VideoSource;

/// Full-video export: decode → composite → encode, one frame at a time.
///
/// Every decoded frame is written, in decode order. On any failure after
/// the output was created, the partial file is removed.
pub struct ExportVideoUseCase {
    source: Box<dyn VideoSource>,
    sink: Box<dyn VideoSink>,
    compositor: Box<dyn FrameCompositor>,
}

impl ExportVideoUseCase {
    pub fn new(
        source: Box<dyn VideoSource>,
        sink: Box<dyn VideoSink>,
        compositor: Box<dyn FrameCompositor>,
    ) -> Self {
        Self {
            source,
            sink,
            compositor,
        }
    }

    /// Returns the number of frames written.
    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
        regions: &[Region],
    ) -> Result<usize, EngineError> {
        let metadata = self
            .source
            .open(input_path)
            .map_err(|e| EngineError::SourceOpen {
                path: input_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        log::info!(
            "Exporting {} ({}x{}, {:.2} fps, {} frames) with {} regions",
            input_path.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.total_frames,
            regions.len()
        );

        // A failed open leaves any existing file at the path alone.
        if let Err(e) = self.sink.open(output_path, &metadata) {
            self.source.close();
            return Err(EngineError::SinkOpen {
                path: output_path.to_path_buf(),
                reason: e.to_string(),
            });
        }

        let result = self.transcode(regions, metadata.total_frames);
        self.source.close();

        match result {
            Ok(written) => {
                log::info!("Wrote {written} frames to {}", output_path.display());
                Ok(written)
            }
            Err(e) => {
                remove_partial_output(output_path);
                Err(e)
            }
        }
    }

    fn transcode(&mut self, regions: &[Region], total_frames: usize) -> Result<usize, EngineError> {
        let mut written = 0;
        loop {
            let frame = match self.source.read_next() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    // Leave the sink closed before reporting.
                    let _ = self.sink.close();
                    return Err(EngineError::Decode {
                        index: written,
                        reason: e.to_string(),
                    });
                }
            };

            let composited = self.compositor.composite(&frame, frame.index(), regions);
            if let Err(e) = self.sink.write_frame(&composited) {
                let _ = self.sink.close();
                return Err(EngineError::SinkWrite {
                    frames_written: written,
                    reason: e.to_string(),
                });
            }
            written += 1;

            if written % PROGRESS_LOG_INTERVAL == 0 {
                log::info!("Processed {written}/{total_frames} frames");
            }
        }

        self.sink.close().map_err(|e| EngineError::SinkWrite {
            frames_written: written,
            reason: e.to_string(),
        })?;
        Ok(written)
    }
}

fn remove_partial_output(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::debug!("Removed partial output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Could not remove partial output {}: {e}", path.display()),
    }
}
