use std::path::Path;

use crate::compositing::domain::frame_compositor::FrameCompositor;
use crate::shared::error::EngineError;
use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::video::domain::video_source::VideoSource;

/// Decodes one frame and composites the regions active at its index.
pub struct PreviewFrameUseCase {
    source: Box<dyn VideoSource>,
    compositor: Box<dyn FrameCompositor>,
}

impl PreviewFrameUseCase {
    pub fn new(source: Box<dyn VideoSource>, compositor: Box<dyn FrameCompositor>) -> Self {
        Self { source, compositor }
    }

    pub fn execute(
        &mut self,
        input_path: &Path,
        frame_index: usize,
        regions: &[Region],
    ) -> Result<Frame, EngineError> {
        let metadata = self
            .source
            .open(input_path)
            .map_err(|e| EngineError::SourceOpen {
                path: input_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let result = self.read_frame(frame_index, metadata.total_frames);
        self.source.close();
        let frame = result?;

        Ok(self.compositor.composite(&frame, frame_index, regions))
    }

    fn read_frame(&mut self, frame_index: usize, frame_count: usize) -> Result<Frame, EngineError> {
        let decode_error = |e: Box<dyn std::error::Error>| EngineError::Decode {
            index: frame_index,
            reason: e.to_string(),
        };

        self.source.seek_to_frame(frame_index).map_err(decode_error)?;
        self.source
            .read_next()
            .map_err(decode_error)?
            .ok_or(EngineError::FrameOutOfRange {
                index: frame_index,
                frame_count,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositing::infrastructure::cpu_frame_compositor::CpuFrameCompositor;
    use crate::shared::region::{Algorithm, Rect, TemporalRange};
    use crate::shared::video_metadata::VideoMetadata;
    use crate::test_support::test_metadata;
    use std::sync::{Arc, Mutex};

    struct StubSource {
        count: usize,
        position: usize,
        closed: Arc<Mutex<bool>>,
    }

    impl StubSource {
        fn new(count: usize) -> Self {
            Self {
                count,
                position: 0,
                closed: Arc::new(Mutex::new(false)),
            }
        }
    }

    impl VideoSource for StubSource {
        fn open(&mut self, _path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            Ok(test_metadata(16, 16, 30.0, self.count))
        }

        fn seek_to_frame(&mut self, index: usize) -> Result<(), Box<dyn std::error::Error>> {
            self.position = index.min(self.count);
            Ok(())
        }

        fn read_next(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
            if self.position >= self.count {
                return Ok(None);
            }
            let frame = Frame::filled(16, 16, self.position as u8, self.position);
            self.position += 1;
            Ok(Some(frame))
        }

        fn close(&mut self) {
            *self.closed.lock().unwrap() = true;
        }
    }

    fn use_case(source: StubSource) -> PreviewFrameUseCase {
        PreviewFrameUseCase::new(Box::new(source), Box::new(CpuFrameCompositor::default()))
    }

    fn white(range: TemporalRange) -> Region {
        Region::new(Rect::new(0, 0, 4, 4), Algorithm::SolidFillWhite, 100, range)
    }

    #[test]
    fn test_returns_requested_frame() {
        let mut uc = use_case(StubSource::new(20));
        let frame = uc.execute(Path::new("in.mp4"), 7, &[]).unwrap();
        assert_eq!(frame.index(), 7);
        assert_eq!(frame.data()[0], 7);
    }

    #[test]
    fn test_applies_only_active_regions() {
        let mut uc = use_case(StubSource::new(20));
        let regions = [white(TemporalRange::single(7)), white(TemporalRange::single(8))];

        let at_7 = uc.execute(Path::new("in.mp4"), 7, &regions).unwrap();
        assert_eq!(at_7.data()[0], 255);

        let at_9 = uc.execute(Path::new("in.mp4"), 9, &regions).unwrap();
        assert_eq!(at_9.data()[0], 9);
    }

    #[test]
    fn test_index_past_end_is_out_of_range() {
        let source = StubSource::new(5);
        let closed = source.closed.clone();
        let mut uc = use_case(source);

        let err = uc.execute(Path::new("in.mp4"), 5, &[]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::FrameOutOfRange {
                index: 5,
                frame_count: 5
            }
        ));
        assert!(*closed.lock().unwrap());
    }
}
