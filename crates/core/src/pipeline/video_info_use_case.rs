use std::path::Path;

use crate::shared::error::EngineError;
use crate::shared::video_metadata::VideoInfo;
use crate::video::domain::video_source::VideoSource;

/// Opens a video just long enough to describe it.
pub struct VideoInfoUseCase {
    source: Box<dyn VideoSource>,
}

impl VideoInfoUseCase {
    pub fn new(source: Box<dyn VideoSource>) -> Self {
        Self { source }
    }

    pub fn execute(&mut self, path: &Path) -> Result<VideoInfo, EngineError> {
        let source_error = |reason: String| EngineError::SourceOpen {
            path: path.to_path_buf(),
            reason,
        };

        let size_bytes = std::fs::metadata(path)
            .map_err(|e| source_error(e.to_string()))?
            .len();
        let metadata = self
            .source
            .open(path)
            .map_err(|e| source_error(e.to_string()))?;
        self.source.close();

        Ok(VideoInfo::from_metadata(&metadata, size_bytes))
    }
}
