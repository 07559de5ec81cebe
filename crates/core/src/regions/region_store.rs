use crate::shared::error::RegionValidationError;
use crate::shared::region::{clamp_intensity, Region, TemporalRange};

/// Stable handle for a region inside a [`RegionStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(u64);

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered collection of authored regions.
///
/// Insertion order is paint order. Regions are never edited in place:
/// they are added, removed, or cleared. Exports should work from
/// [`RegionStore::list`], which returns an independent snapshot.
#[derive(Debug, Default)]
pub struct RegionStore {
    entries: Vec<(RegionId, Region)>,
    next_id: u64,
}

impl RegionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and normalizes `region`, then appends it.
    pub fn add(&mut self, region: Region) -> Result<RegionId, RegionValidationError> {
        let region = normalize(region)?;
        let id = RegionId(self.next_id);
        self.next_id += 1;
        log::debug!(
            "Added region {id}: {} {:?} intensity {}",
            region.algorithm,
            region.rect,
            region.intensity
        );
        self.entries.push((id, region));
        Ok(id)
    }

    pub fn remove(&mut self, id: RegionId) -> Option<Region> {
        let pos = self.entries.iter().position(|(eid, _)| *eid == id)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.entries
            .iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, r)| r)
    }

    /// Snapshot of the regions in paint order.
    pub fn list(&self) -> Vec<Region> {
        self.entries.iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Applies the store's admission rules to a region.
///
/// Zero or negative area is rejected. Intensity is clamped into
/// `[10, 100]`, and an end frame before the start frame becomes open-ended.
pub fn normalize(region: Region) -> Result<Region, RegionValidationError> {
    if region.rect.width <= 0 || region.rect.height <= 0 {
        return Err(RegionValidationError::ZeroArea {
            width: region.rect.width,
            height: region.rect.height,
        });
    }
    let range = region.temporal_range;
    Ok(Region {
        intensity: clamp_intensity(region.intensity as i64),
        temporal_range: TemporalRange::new(range.start, range.end),
        ..region
    })
}
