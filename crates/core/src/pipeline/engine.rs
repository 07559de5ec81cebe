use std::path::Path;

use crate::animation::animated_exporter::AnimatedExporter;
use crate::compositing::domain::strength_curve::StrengthCurve;
use crate::compositing::infrastructure::cpu_frame_compositor::CpuFrameCompositor;
use crate::shared::error::EngineError;
use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::shared::video_metadata::VideoInfo;
use crate::video::infrastructure::ffmpeg_sink::FfmpegSink;
use crate::video::infrastructure::ffmpeg_source::FfmpegSource;
use crate::video::infrastructure::gif_file_writer::GifFileWriter;

use super::export_animation_use_case::ExportAnimationUseCase;
use super::export_video_use_case::ExportVideoUseCase;
use super::preview_frame_use_case::PreviewFrameUseCase;
use super::video_info_use_case::VideoInfoUseCase;

/// Result of [`Engine::export_video`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOutcome {
    pub success: bool,
    /// Frames written; on failure, the frames written before it.
    pub total_frames: usize,
    pub error: Option<String>,
}

/// Result of [`Engine::export_animated`].
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationOutcome {
    pub success: bool,
    pub frame_count: usize,
    pub error: Option<String>,
}

/// Entry points for the authoring layer, wired to the ffmpeg and `image`
/// backed implementations.
///
/// Every call opens its own source, so concurrent previews and exports
/// never share decoder state. Region slices are borrowed for the whole
/// call and cannot change mid-export.
#[derive(Clone, Copy, Debug, Default)]
pub struct Engine {
    curve: StrengthCurve,
}

impl Engine {
    pub fn new(curve: StrengthCurve) -> Self {
        Self { curve }
    }

    fn compositor(&self) -> Box<CpuFrameCompositor> {
        Box::new(CpuFrameCompositor::new(self.curve))
    }

    pub fn get_video_info(&self, path: &Path) -> Result<VideoInfo, EngineError> {
        VideoInfoUseCase::new(Box::new(FfmpegSource::new())).execute(path)
    }

    pub fn composite_single_frame(
        &self,
        path: &Path,
        frame_index: usize,
        regions: &[Region],
    ) -> Result<Frame, EngineError> {
        PreviewFrameUseCase::new(Box::new(FfmpegSource::new()), self.compositor()).execute(
            path,
            frame_index,
            regions,
        )
    }

    pub fn export_video(&self, path: &Path, output_path: &Path, regions: &[Region]) -> ExportOutcome {
        let mut use_case = ExportVideoUseCase::new(
            Box::new(FfmpegSource::new()),
            Box::new(FfmpegSink::new()),
            self.compositor(),
        );
        match use_case.execute(path, output_path, regions) {
            Ok(total_frames) => ExportOutcome {
                success: true,
                total_frames,
                error: None,
            },
            Err(e) => {
                log::error!("Video export failed: {e}");
                ExportOutcome {
                    success: false,
                    total_frames: e.frames_written(),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn export_animated(
        &self,
        path: &Path,
        output_path: &Path,
        regions: &[Region],
        target_frames: usize,
        max_width: u32,
    ) -> AnimationOutcome {
        let mut use_case = ExportAnimationUseCase::new(
            Box::new(FfmpegSource::new()),
            self.compositor(),
            AnimatedExporter::new(Box::new(GifFileWriter::new())),
        );
        match use_case.execute(path, output_path, regions, target_frames, max_width) {
            Ok(frame_count) => AnimationOutcome {
                success: true,
                frame_count,
                error: None,
            },
            Err(e) => {
                log::error!("Animated export failed: {e}");
                AnimationOutcome {
                    success: false,
                    frame_count: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::region::{Algorithm, Rect, TemporalRange};
    use crate::test_support::{write_test_video, StripedFrames};
    use crate::video::domain::video_source::VideoSource;

    /// Raw decoded frame, for comparison with composited previews.
    fn decode_frame(path: &Path, index: usize) -> Frame {
        let mut source = FfmpegSource::new();
        source.open(path).unwrap();
        source.seek_to_frame(index).unwrap();
        source.read_next().unwrap().unwrap()
    }

    fn region_pixels(frame: &Frame, rect: Rect) -> Vec<u8> {
        frame.crop(rect).unwrap().iter().copied().collect()
    }

    #[test]
    fn test_region_active_only_within_its_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        write_test_video(&path, 60, 720, 480, 30.0, &StripedFrames);

        let rect = Rect::new(100, 50, 200, 150);
        let regions = [Region::new(
            rect,
            Algorithm::GaussianBlur,
            90,
            TemporalRange::through(0, 30),
        )];
        let engine = Engine::default();

        let at_15 = engine.composite_single_frame(&path, 15, &regions).unwrap();
        assert_ne!(
            region_pixels(&at_15, rect),
            region_pixels(&decode_frame(&path, 15), rect)
        );

        let at_45 = engine.composite_single_frame(&path, 45, &regions).unwrap();
        assert_eq!(
            region_pixels(&at_45, rect),
            region_pixels(&decode_frame(&path, 45), rect)
        );
    }

    #[test]
    fn test_video_info_matches_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        write_test_video(&path, 60, 160, 120, 30.0, &StripedFrames);

        let info = Engine::default().get_video_info(&path).unwrap();
        assert_eq!(info.frame_count, 60);
        assert_eq!((info.width, info.height), (160, 120));
    }

    #[test]
    fn test_export_video_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        let output = dir.path().join("out.mp4");
        write_test_video(&input, 20, 64, 48, 30.0, &StripedFrames);

        let outcome = Engine::default().export_video(&input, &output, &[]);
        assert_eq!(
            outcome,
            ExportOutcome {
                success: true,
                total_frames: 20,
                error: None
            }
        );
        assert!(output.exists());
    }

    #[test]
    fn test_export_video_missing_input_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.mp4");

        let outcome =
            Engine::default().export_video(Path::new("/nonexistent/in.mp4"), &output, &[]);
        assert!(!outcome.success);
        assert_eq!(outcome.total_frames, 0);
        assert!(outcome.error.unwrap().contains("/nonexistent/in.mp4"));
        assert!(!output.exists());
    }

    #[test]
    fn test_export_animated_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        let output = dir.path().join("out.gif");
        write_test_video(&input, 150, 64, 48, 30.0, &StripedFrames);

        let outcome = Engine::new(StrengthCurve::BASIC).export_animated(&input, &output, &[], 15, 800);
        assert_eq!(
            outcome,
            AnimationOutcome {
                success: true,
                frame_count: 15,
                error: None
            }
        );
    }

    #[test]
    fn test_preview_past_end_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        write_test_video(&path, 5, 64, 48, 30.0, &StripedFrames);

        let err = Engine::default()
            .composite_single_frame(&path, 50, &[])
            .unwrap_err();
        assert!(matches!(err, EngineError::FrameOutOfRange { index: 50, .. }));
    }
}
