//! Positioning
//!
//! Everything between the platform's raw position stream and the values the
//! rest of the dashboard consumes: the sampler abstraction, the speed
//! estimator and the map-follow state machine.

pub mod estimator;
pub mod follow;
pub mod sampler;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::LatLon;

/// One raw reading from the platform position stream
///
/// Ephemeral; samples are processed in arrival order and never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    /// Reported coordinate
    pub pos: LatLon,
    /// Device-reported ground speed in m/s, when the platform provides one
    pub speed_mps: Option<f64>,
    /// Heading in degrees clockwise from true north, when available
    pub heading_deg: Option<f64>,
    /// Milliseconds since an arbitrary epoch shared by all samples of a watch
    pub timestamp_ms: u64,
}

impl PositionSample {
    /// Whether the coordinate is inside valid lat/lon ranges
    pub fn is_valid(&self) -> bool {
        self.pos.is_valid()
    }
}

/// Observable permission/availability state of the position source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GpsStatus {
    /// Permission has not been requested or answered yet
    #[default]
    Prompt,
    /// Stream is delivering samples
    Granted,
    /// Permission denied or the source failed; terminal until the platform
    /// permission changes, no automatic retry
    Denied,
    /// No position source exists on this platform
    Unsupported,
}

/// Failures reported by the position source instead of a sample
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GpsError {
    /// The user declined the location permission
    #[error("location permission denied")]
    PermissionDenied,
    /// The source exists but produced no fix
    #[error("position unavailable: {0}")]
    Unavailable(String),
    /// The platform has no position source at all
    #[error("no position source on this platform")]
    Unsupported,
}

impl GpsError {
    /// The status a consumer should surface for this failure
    pub fn status(&self) -> GpsStatus {
        match self {
            GpsError::PermissionDenied | GpsError::Unavailable(_) => GpsStatus::Denied,
            GpsError::Unsupported => GpsStatus::Unsupported,
        }
    }
}

/// What a position watch emits: a fix or a distinguishable fault
#[derive(Debug, Clone, PartialEq)]
pub enum GpsEvent {
    /// A new position sample
    Fix(PositionSample),
    /// The source failed; callers degrade to a status flag, never a crash
    Fault(GpsError),
}

/// Whether the dashboard UI is currently visible
///
/// Drives two battery policies: the position watch pauses while hidden, and
/// the live-share relay skips its ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// The UI is on screen
    #[default]
    Visible,
    /// The UI is backgrounded or the screen is off
    Hidden,
}
