//! Auto-center / auto-zoom after a new selection.
//!
//! The controller runs a two-phase machine. A distinct, non-empty selection
//! moves it to `PendingZoom`; once the outlets it names are loaded the camera
//! action and popups are applied exactly once and the machine latches back to
//! `Idle` until the selection changes again.

use std::convert::TryFrom;
use std::fmt;
use std::time::Duration;

use crate::domain::{Outlet, OutletId};
use crate::geo::{BoundingBox, GeoPoint};
use crate::selection::{IdSet, SelectionController};
use crate::store::OutletStore;

pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new(3.139, 101.6869);
pub const DEFAULT_ZOOM: f64 = 12.0;
pub const SEARCH_ZOOM: f64 = 14.0;
pub const FIT_PADDING_PX: f64 = 50.0;
pub const CAMERA_ANIMATION: Duration = Duration::from_secs(1);

/// The map-drawing side of the viewport commands.
pub trait MapSurface {
    fn set_view(&mut self, center: GeoPoint, zoom: f64, animation: Duration);
    fn fit_bounds(&mut self, bounds: BoundingBox, padding_px: f64, animation: Duration);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    SetView {
        center: GeoPoint,
        zoom: f64,
        animation: Duration,
    },
    FitBounds {
        bounds: BoundingBox,
        padding_px: f64,
        animation: Duration,
    },
}

impl CameraCommand {
    pub fn apply_to<S: MapSurface + ?Sized>(self, surface: &mut S) {
        match self {
            Self::SetView {
                center,
                zoom,
                animation,
            } => surface.set_view(center, zoom, animation),
            Self::FitBounds {
                bounds,
                padding_px,
                animation,
            } => surface.fit_bounds(bounds, padding_px, animation),
        }
    }
}

impl fmt::Display for CameraCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetView { center, zoom, .. } => write!(f, "center on {center} at zoom {zoom}"),
            Self::FitBounds {
                bounds, padding_px, ..
            } => write!(f, "fit {bounds} with {padding_px}px padding"),
        }
    }
}

/// Records commands instead of drawing. Used by headless mode.
impl MapSurface for Vec<CameraCommand> {
    fn set_view(&mut self, center: GeoPoint, zoom: f64, animation: Duration) {
        self.push(CameraCommand::SetView {
            center,
            zoom,
            animation,
        });
    }

    fn fit_bounds(&mut self, bounds: BoundingBox, padding_px: f64, animation: Duration) {
        self.push(CameraCommand::FitBounds {
            bounds,
            padding_px,
            animation,
        });
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ZoomPhase {
    Idle,
    PendingZoom,
}

impl fmt::Display for ZoomPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::PendingZoom => write!(f, "PendingZoom"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ZoomEvent {
    SelectionChanged,
    SelectionCleared,
    Applied,
}

impl fmt::Display for ZoomEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectionChanged => write!(f, "SelectionChanged"),
            Self::SelectionCleared => write!(f, "SelectionCleared"),
            Self::Applied => write!(f, "Applied"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid viewport transition from {from} with event {event}")]
pub struct PhaseTransitionError {
    pub from: ZoomPhase,
    pub event: ZoomEvent,
}

struct NextPhase(ZoomPhase);

impl TryFrom<(ZoomPhase, ZoomEvent)> for NextPhase {
    type Error = PhaseTransitionError;

    fn try_from(value: (ZoomPhase, ZoomEvent)) -> Result<Self, Self::Error> {
        match value {
            // A new distinct selection restarts the episode from either phase.
            (_, ZoomEvent::SelectionChanged) => Ok(Self(ZoomPhase::PendingZoom)),
            (_, ZoomEvent::SelectionCleared) => Ok(Self(ZoomPhase::Idle)),
            (ZoomPhase::PendingZoom, ZoomEvent::Applied) => Ok(Self(ZoomPhase::Idle)),
            (from, event) => Err(PhaseTransitionError { from, event }),
        }
    }
}

/// What one [`ViewportController::sync`] call did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SyncOutcome {
    pub camera: Option<CameraCommand>,
    pub popups_opened: Vec<OutletId>,
    pub popups_closed: Vec<OutletId>,
}

impl SyncOutcome {
    pub fn is_noop(&self) -> bool {
        self.camera.is_none() && self.popups_opened.is_empty() && self.popups_closed.is_empty()
    }
}

#[derive(Debug)]
pub struct ViewportController {
    phase: ZoomPhase,
    previous: IdSet,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportController {
    pub const fn new() -> Self {
        Self {
            phase: ZoomPhase::Idle,
            previous: IdSet::new(),
        }
    }

    pub const fn phase(&self) -> ZoomPhase {
        self.phase
    }

    pub fn process_event(&mut self, event: ZoomEvent) -> Result<ZoomPhase, PhaseTransitionError> {
        let NextPhase(next) = NextPhase::try_from((self.phase, event))?;
        if next != self.phase {
            tracing::debug!(from = %self.phase, to = %next, %event, "viewport phase changed");
        }
        self.phase = next;
        Ok(next)
    }

    fn fire(&mut self, event: ZoomEvent) {
        if let Err(error) = self.process_event(event) {
            // Non-fatal: the phase is left as it was.
            tracing::warn!(%error, "ignored viewport event");
        }
    }

    /// Reconciles the camera and popups with the current selection.
    ///
    /// Call after every state change: chat answers, marker clicks, popup
    /// closes, clears and the outlet load all go through here.
    pub fn sync<S: MapSurface + ?Sized>(
        &mut self,
        selection: &mut SelectionController,
        store: &OutletStore,
        surface: &mut S,
    ) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();

        let current = selection.selected().clone();
        if !current.is_empty() && current.differs_from(&self.previous) {
            self.fire(ZoomEvent::SelectionChanged);
        }
        self.previous = current;

        if selection.selected().is_empty() {
            if self.phase != ZoomPhase::Idle {
                self.fire(ZoomEvent::SelectionCleared);
            }
            if !selection.open_popups().is_empty() {
                outcome.popups_closed = selection.take_open_popups().iter().collect();
                tracing::debug!(closed = ?outcome.popups_closed, "selection cleared, closing popups");
            }
            return outcome;
        }

        if self.phase != ZoomPhase::PendingZoom || !store.is_loaded() || store.is_empty() {
            return outcome;
        }

        let resolved = store.resolve(selection.selected().as_slice());
        if resolved.is_empty() {
            return outcome;
        }

        if is_chat_originated(selection) {
            outcome.camera = camera_for(&resolved);
            if let Some(command) = outcome.camera {
                tracing::debug!(%command, "auto camera action");
                command.apply_to(surface);
            }

            for outlet in &resolved {
                if selection.open_popup(outlet.id) {
                    outcome.popups_opened.push(outlet.id);
                }
            }
        }

        self.fire(ZoomEvent::Applied);
        outcome
    }
}

/// A selection counts as chat-originated when no popup is open, or none of
/// the selected outlets already has its popup open.
fn is_chat_originated(selection: &SelectionController) -> bool {
    let open = selection.open_popups();
    open.is_empty() || !selection.selected().iter().any(|id| open.contains(id))
}

fn camera_for(resolved: &[&Outlet]) -> Option<CameraCommand> {
    match resolved {
        [] => None,
        [only] => only.position().map(|center| CameraCommand::SetView {
            center,
            zoom: SEARCH_ZOOM,
            animation: CAMERA_ANIMATION,
        }),
        many => BoundingBox::from_points(many.iter().filter_map(|outlet| outlet.position()))
            .filter(BoundingBox::is_valid)
            .map(|bounds| CameraCommand::FitBounds {
                bounds,
                padding_px: FIT_PADDING_PX,
                animation: CAMERA_ANIMATION,
            }),
    }
}
