use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::regions::region_store::normalize;
use crate::shared::constants::{DEFAULT_INTENSITY, DEFAULT_PII_TYPE, OPEN_END_FRAME};
use crate::shared::error::{PersistenceError, RegionValidationError};
use crate::shared::region::{Algorithm, FrameBound, Rect, Region, TemporalRange};

/// On-disk form of a region file.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegionFile {
    pub regions: Vec<RegionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub blur_type: String,
    #[serde(default = "default_intensity")]
    pub intensity: i64,
    /// Category label from the authoring tool. Not used for rendering.
    #[serde(default = "default_pii_type")]
    pub pii_type: String,
    #[serde(default)]
    pub start_frame: i64,
    #[serde(default = "open_end")]
    pub end_frame: i64,
}

fn default_intensity() -> i64 {
    DEFAULT_INTENSITY as i64
}

fn default_pii_type() -> String {
    DEFAULT_PII_TYPE.to_string()
}

fn open_end() -> i64 {
    OPEN_END_FRAME
}

impl From<&Region> for RegionRecord {
    fn from(region: &Region) -> Self {
        let end_frame = match region.temporal_range.end {
            FrameBound::Through(end) => end as i64,
            FrameBound::Open => OPEN_END_FRAME,
        };
        Self {
            x: region.rect.x,
            y: region.rect.y,
            width: region.rect.width,
            height: region.rect.height,
            blur_type: region.algorithm.as_str().to_string(),
            intensity: region.intensity as i64,
            pii_type: default_pii_type(),
            start_frame: region.temporal_range.start as i64,
            end_frame,
        }
    }
}

impl RegionRecord {
    /// Converts and validates with the same rules as `RegionStore::add`.
    pub fn to_region(&self) -> Result<Region, PersistenceError> {
        let algorithm = Algorithm::parse(&self.blur_type)
            .ok_or_else(|| PersistenceError::UnknownAlgorithm(self.blur_type.clone()))?;
        if self.start_frame < 0 {
            return Err(invalid(RegionValidationError::NegativeStart(self.start_frame)));
        }
        let start = self.start_frame as usize;
        let end = if self.end_frame < 0 {
            FrameBound::Open
        } else {
            FrameBound::Through(self.end_frame as usize)
        };
        let region = Region::new(
            Rect::new(self.x, self.y, self.width, self.height),
            algorithm,
            self.intensity.clamp(0, u8::MAX as i64) as u8,
            TemporalRange::new(start, end),
        );
        normalize(region).map_err(invalid)
    }
}

/// Index is filled in by [`load_regions`].
fn invalid(source: RegionValidationError) -> PersistenceError {
    PersistenceError::InvalidRegion { index: 0, source }
}

pub fn save_regions(path: &Path, regions: &[Region]) -> Result<(), PersistenceError> {
    let file = RegionFile {
        regions: regions.iter().map(RegionRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&file).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Saved {} regions to {}", regions.len(), path.display());
    Ok(())
}

/// Loads a region file. The first invalid record fails the whole load.
pub fn load_regions(path: &Path) -> Result<Vec<Region>, PersistenceError> {
    let text = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: RegionFile = serde_json::from_str(&text).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let regions = file
        .regions
        .iter()
        .enumerate()
        .map(|(index, record)| {
            record.to_region().map_err(|e| match e {
                PersistenceError::InvalidRegion { source, .. } => {
                    PersistenceError::InvalidRegion { index, source }
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::info!("Loaded {} regions from {}", regions.len(), path.display());
    Ok(regions)
}
