//! Map-follow state machine
//!
//! Governs whether the map camera snaps to the vehicle (`Following`) or is
//! under free user control (`FreeLook`). Any map interaction drops to
//! free-look and arms an inactivity deadline; the deadline elapsing or an
//! explicit recenter tap returns to following.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::geo::{GeoBounds, LatLon};

/// Inactivity timeout before the camera snaps back to the vehicle
pub const FOLLOW_RESUME_TIMEOUT: Duration = Duration::from_secs(15);

/// Fixed zoom used when centring on the vehicle without a route
pub const FOLLOW_ZOOM: u8 = 15;

/// Viewport padding in pixels when framing a route
pub const ROUTE_FIT_PADDING: u32 = 50;

/// Camera tracking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowMode {
    /// Camera tracks the vehicle's live position
    Following,
    /// User has panned/zoomed away; camera is theirs until the timeout
    FreeLook,
}

/// Camera angle preset; affects pitch/zoom parameters only, never the
/// follow transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MapPerspective {
    /// Tilted chase-camera view
    #[default]
    Driving,
    /// Straight-down overview
    TopDown,
}

impl MapPerspective {
    /// Camera pitch in degrees for this perspective
    pub fn pitch_deg(&self) -> f64 {
        match self {
            MapPerspective::Driving => 60.0,
            MapPerspective::TopDown => 0.0,
        }
    }

    /// The other perspective
    pub fn toggled(&self) -> Self {
        match self {
            MapPerspective::Driving => MapPerspective::TopDown,
            MapPerspective::TopDown => MapPerspective::Driving,
        }
    }
}

/// Where the camera should move while following
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraTarget {
    /// Frame the whole route with padding
    FitBounds { bounds: GeoBounds, padding: u32 },
    /// Centre on the vehicle at a fixed zoom
    Center { pos: LatLon, zoom: u8 },
}

/// Follow/free-look state with the inactivity deadline
#[derive(Debug, Clone)]
pub struct FollowState {
    mode: FollowMode,
    perspective: MapPerspective,
    resume_at: Option<Instant>,
    timeout: Duration,
}

impl FollowState {
    /// Start in `Following` with the driving perspective and the standard
    /// inactivity timeout
    pub fn new() -> Self {
        Self::with_timeout(FOLLOW_RESUME_TIMEOUT)
    }

    /// Start in `Following` with a custom inactivity timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            mode: FollowMode::Following,
            perspective: MapPerspective::default(),
            resume_at: None,
            timeout,
        }
    }

    /// Change the inactivity timeout; an armed deadline is unaffected
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Current mode
    pub fn mode(&self) -> FollowMode {
        self.mode
    }

    /// Whether the camera is auto-tracking
    pub fn is_following(&self) -> bool {
        self.mode == FollowMode::Following
    }

    /// Current perspective
    pub fn perspective(&self) -> MapPerspective {
        self.perspective
    }

    /// Set the perspective (no mode transition)
    pub fn set_perspective(&mut self, perspective: MapPerspective) {
        self.perspective = perspective;
    }

    /// Flip between driving and top-down
    pub fn toggle_perspective(&mut self) {
        self.perspective = self.perspective.toggled();
    }

    /// A map drag/zoom/scroll happened at `now`
    ///
    /// Drops to free-look and re-arms the inactivity deadline. Rapid
    /// interactions each reset the deadline; they never accumulate.
    pub fn on_interaction(&mut self, now: Instant) {
        self.mode = FollowMode::FreeLook;
        self.resume_at = Some(now + self.timeout);
    }

    /// Check the inactivity deadline; returns true when it just resumed
    /// following
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.mode == FollowMode::FreeLook {
            if let Some(at) = self.resume_at {
                if now >= at {
                    self.recenter();
                    return true;
                }
            }
        }
        false
    }

    /// Explicit recenter tap: follow immediately, cancel any pending deadline
    pub fn recenter(&mut self) {
        self.mode = FollowMode::Following;
        self.resume_at = None;
    }

    /// Where the camera should go, or `None` when not following or nothing
    /// to target
    ///
    /// With an active route the viewport fits the route bounds; otherwise it
    /// centres on the vehicle at a fixed zoom.
    pub fn camera_target(
        &self,
        pos: Option<LatLon>,
        route_coords: Option<&[LatLon]>,
    ) -> Option<CameraTarget> {
        if !self.is_following() {
            return None;
        }
        if let Some(bounds) = route_coords.and_then(GeoBounds::from_coords) {
            return Some(CameraTarget::FitBounds {
                bounds,
                padding: ROUTE_FIT_PADDING,
            });
        }
        pos.map(|pos| CameraTarget::Center {
            pos,
            zoom: FOLLOW_ZOOM,
        })
    }
}

impl Default for FollowState {
    fn default() -> Self {
        Self::new()
    }
}
