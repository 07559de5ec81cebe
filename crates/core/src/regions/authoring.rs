use thiserror::Error;

use crate::regions::region_store::{RegionId, RegionStore};
use crate::shared::error::RegionValidationError;
use crate::shared::region::{Algorithm, Rect, Region, TemporalRange};
use crate::shared::video_metadata::frame_index_at;

#[derive(Error, Debug, PartialEq)]
pub enum AuthoringError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error(transparent)]
    Rejected(#[from] RegionValidationError),
}

/// Effect settings chosen when a drawn rectangle is held or confirmed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionSettings {
    pub algorithm: Algorithm,
    pub intensity: u8,
    pub start_second: f64,
    pub duration_seconds: f64,
}

impl RegionSettings {
    /// `[floor(start * fps), floor((start + duration) * fps)]`.
    pub fn temporal_range(&self, fps: f64) -> TemporalRange {
        let start = frame_index_at(self.start_second, fps);
        let end = frame_index_at(self.start_second + self.duration_seconds.max(0.0), fps);
        TemporalRange::through(start, end)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AuthoringState {
    Idle,
    Drawing { anchor: (i32, i32), cursor: (i32, i32) },
    /// A rectangle exists but has no effect settings yet.
    Pending { rect: Rect },
    /// Settings are frozen; the region shows in previews but is not stored.
    Held { region: Region },
}

impl AuthoringState {
    fn name(&self) -> &'static str {
        match self {
            AuthoringState::Idle => "idle",
            AuthoringState::Drawing { .. } => "drawing",
            AuthoringState::Pending { .. } => "pending",
            AuthoringState::Held { .. } => "held",
        }
    }
}

/// Draw → pending → hold/confirm workflow for a single rectangle.
///
/// Only [`AuthoringSession::confirm`] touches the [`RegionStore`].
#[derive(Debug)]
pub struct AuthoringSession {
    state: AuthoringState,
    fps: f64,
}

impl AuthoringSession {
    pub fn new(fps: f64) -> Self {
        Self {
            state: AuthoringState::Idle,
            fps,
        }
    }

    pub fn state(&self) -> &AuthoringState {
        &self.state
    }

    pub fn begin_draw(&mut self, x: i32, y: i32) -> Result<(), AuthoringError> {
        match self.state {
            AuthoringState::Idle | AuthoringState::Pending { .. } => {
                self.state = AuthoringState::Drawing {
                    anchor: (x, y),
                    cursor: (x, y),
                };
                Ok(())
            }
            _ => Err(self.invalid("start drawing")),
        }
    }

    pub fn drag_to(&mut self, x: i32, y: i32) -> Result<(), AuthoringError> {
        match &mut self.state {
            AuthoringState::Drawing { cursor, .. } => {
                *cursor = (x, y);
                Ok(())
            }
            _ => Err(self.invalid("drag")),
        }
    }

    /// Finishes the drag. A zero-area rectangle is discarded.
    pub fn release(&mut self, x: i32, y: i32) -> Result<Option<Rect>, AuthoringError> {
        let AuthoringState::Drawing { anchor, .. } = self.state else {
            return Err(self.invalid("release"));
        };
        let rect = Rect::new(
            anchor.0.min(x),
            anchor.1.min(y),
            span(anchor.0, x),
            span(anchor.1, y),
        );
        if rect.area() == 0 {
            self.state = AuthoringState::Idle;
            return Ok(None);
        }
        self.state = AuthoringState::Pending { rect };
        Ok(Some(rect))
    }

    /// Toggles the hold: pending becomes held, held goes back to pending.
    pub fn hold(&mut self, settings: RegionSettings) -> Result<(), AuthoringError> {
        self.state = match &self.state {
            AuthoringState::Pending { rect } => AuthoringState::Held {
                region: self.build(*rect, settings),
            },
            AuthoringState::Held { region } => AuthoringState::Pending { rect: region.rect },
            _ => return Err(self.invalid("hold")),
        };
        Ok(())
    }

    /// Stores the held region, or the pending rectangle with `settings`.
    pub fn confirm(
        &mut self,
        settings: RegionSettings,
        store: &mut RegionStore,
    ) -> Result<RegionId, AuthoringError> {
        let region = match &self.state {
            AuthoringState::Held { region } => region.clone(),
            AuthoringState::Pending { rect } => self.build(*rect, settings),
            _ => return Err(self.invalid("confirm")),
        };
        let id = store.add(region)?;
        self.state = AuthoringState::Idle;
        Ok(id)
    }

    pub fn cancel(&mut self) {
        self.state = AuthoringState::Idle;
    }

    /// Confirmed regions plus the held one, painted last.
    pub fn preview_regions(&self, store: &RegionStore) -> Vec<Region> {
        let mut regions = store.list();
        if let AuthoringState::Held { region } = &self.state {
            regions.push(region.clone());
        }
        regions
    }

    fn build(&self, rect: Rect, settings: RegionSettings) -> Region {
        Region::new(
            rect,
            settings.algorithm,
            settings.intensity,
            settings.temporal_range(self.fps),
        )
    }

    fn invalid(&self, action: &'static str) -> AuthoringError {
        AuthoringError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }
}

fn span(a: i32, b: i32) -> i32 {
    a.abs_diff(b).min(i32::MAX as u32) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> RegionSettings {
        RegionSettings {
            algorithm: Algorithm::Pixelate,
            intensity: 70,
            start_second: 2.0,
            duration_seconds: 3.0,
        }
    }

    fn drawn_session() -> AuthoringSession {
        let mut s = AuthoringSession::new(30.0);
        s.begin_draw(50, 40).unwrap();
        s.drag_to(80, 60).unwrap();
        s.release(20, 10).unwrap();
        s
    }

    #[test]
    fn test_release_normalizes_rectangle() {
        let s = drawn_session();
        assert_eq!(
            s.state(),
            &AuthoringState::Pending {
                rect: Rect::new(20, 10, 30, 30)
            }
        );
    }

    #[test]
    fn test_release_across_full_coordinate_range_saturates() {
        let mut session = AuthoringSession::new(30.0);
        session.begin_draw(i32::MIN, i32::MIN).unwrap();
        let rect = session.release(i32::MAX, 10).unwrap().unwrap();
        assert_eq!(rect.x, i32::MIN);
        assert_eq!(rect.width, i32::MAX);
        assert_eq!(rect.height, i32::MAX);
    }

    #[test]
    fn test_zero_area_release_returns_to_idle() {
        let mut s = AuthoringSession::new(30.0);
        s.begin_draw(5, 5).unwrap();
        assert_eq!(s.release(5, 90).unwrap(), None);
        assert_eq!(s.state(), &AuthoringState::Idle);
    }

    #[test]
    fn test_confirm_pending_converts_seconds_to_frames() {
        let mut s = drawn_session();
        let mut store = RegionStore::new();
        let id = s.confirm(settings(), &mut store).unwrap();
        let region = store.get(id).unwrap();
        assert_eq!(region.temporal_range, TemporalRange::through(60, 150));
        assert_eq!(region.algorithm, Algorithm::Pixelate);
        assert_eq!(s.state(), &AuthoringState::Idle);
    }

    #[test]
    fn test_held_region_uses_settings_at_hold_time() {
        let mut s = drawn_session();
        let mut store = RegionStore::new();
        s.hold(settings()).unwrap();
        let later = RegionSettings {
            algorithm: Algorithm::SolidFillBlack,
            ..settings()
        };
        let id = s.confirm(later, &mut store).unwrap();
        assert_eq!(store.get(id).unwrap().algorithm, Algorithm::Pixelate);
    }

    #[test]
    fn test_hold_toggles_back_to_pending() {
        let mut s = drawn_session();
        s.hold(settings()).unwrap();
        assert!(matches!(s.state(), AuthoringState::Held { .. }));
        s.hold(settings()).unwrap();
        assert!(matches!(s.state(), AuthoringState::Pending { .. }));
    }

    #[test]
    fn test_preview_includes_held_region_last() {
        let mut store = RegionStore::new();
        let mut first = drawn_session();
        first.confirm(settings(), &mut store).unwrap();

        let mut s = drawn_session();
        s.hold(RegionSettings {
            algorithm: Algorithm::SolidFillWhite,
            ..settings()
        })
        .unwrap();
        let preview = s.preview_regions(&store);
        assert_eq!(preview.len(), 2);
        assert_eq!(preview[1].algorithm, Algorithm::SolidFillWhite);
        assert_eq!(store.len(), 1, "held regions are not stored");
    }

    #[test]
    fn test_invalid_transitions() {
        let mut s = AuthoringSession::new(30.0);
        let mut store = RegionStore::new();
        assert_eq!(
            s.confirm(settings(), &mut store),
            Err(AuthoringError::InvalidTransition {
                action: "confirm",
                state: "idle"
            })
        );
        assert!(s.hold(settings()).is_err());
        assert!(s.drag_to(1, 1).is_err());

        let mut held = drawn_session();
        held.hold(settings()).unwrap();
        assert!(held.begin_draw(0, 0).is_err());
    }

    #[test]
    fn test_cancel_discards_work() {
        let mut s = drawn_session();
        s.hold(settings()).unwrap();
        s.cancel();
        assert_eq!(s.state(), &AuthoringState::Idle);
    }
}
