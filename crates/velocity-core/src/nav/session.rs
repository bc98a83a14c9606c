//! Navigation session
//!
//! The single writer over the shared driving state. Consumers (speedometer,
//! map camera, live-share relay) observe it through a watch channel; only the
//! session mutates position, speed, follow mode, destination and route.

use std::future::Future;
use std::time::Instant;

use tokio::sync::watch;
use tracing::warn;

use crate::geo::{haversine_distance, LatLon};
use crate::position::estimator::SpeedEstimator;
use crate::position::follow::{CameraTarget, FollowState, MapPerspective};
use crate::position::{GpsEvent, GpsStatus, Visibility};
use crate::store::types::SavedLocation;
use crate::store::StoreError;
use crate::units::SpeedUnit;

use super::route::{RouteData, RouteProvider};

/// How far the vehicle must travel from the origin of the last route request
/// before a position update triggers a recompute. Sub-meter GPS jitter never
/// issues requests.
pub const REROUTE_THRESHOLD_M: f64 = 50.0;

/// Sink for the recent-destination history
///
/// Kept narrow so the session cannot touch the rest of the store.
pub trait RecentHistory: Send + Sync {
    /// Upsert a destination into the recent history
    fn record_recent(&self, loc: SavedLocation) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Read-only snapshot of the shared driving state
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSnapshot {
    /// Last known position
    pub pos: Option<LatLon>,
    /// Raw fused speed estimate in m/s (not the smoothed display value)
    pub speed_mps: f64,
    /// Heading in degrees, when the platform reports one
    pub heading_deg: Option<f64>,
    /// Permission/availability state of the position source
    pub gps_status: GpsStatus,
    /// Whether the dashboard UI is visible
    pub visibility: Visibility,
}

impl Default for VehicleSnapshot {
    fn default() -> Self {
        Self {
            pos: None,
            speed_mps: 0.0,
            heading_deg: None,
            gps_status: GpsStatus::Prompt,
            visibility: Visibility::Visible,
        }
    }
}

/// Orchestrates destination selection, route computation and follow state
pub struct NavigationSession<R, H> {
    routes: R,
    history: H,
    estimator: SpeedEstimator,
    follow: FollowState,
    active_destination: Option<SavedLocation>,
    active_route: Option<RouteData>,
    /// Position the active route was computed from
    last_routed_from: Option<LatLon>,
    snapshot: watch::Sender<VehicleSnapshot>,
}

impl<R, H> NavigationSession<R, H>
where
    R: RouteProvider,
    H: RecentHistory,
{
    /// Create a session over a route provider and a recent-history sink
    pub fn new(routes: R, history: H) -> Self {
        let (snapshot, _) = watch::channel(VehicleSnapshot::default());
        Self {
            routes,
            history,
            estimator: SpeedEstimator::new(),
            follow: FollowState::new(),
            active_destination: None,
            active_route: None,
            last_routed_from: None,
            snapshot,
        }
    }

    /// Subscribe to driving-state snapshots
    pub fn subscribe(&self) -> watch::Receiver<VehicleSnapshot> {
        self.snapshot.subscribe()
    }

    /// Current snapshot
    pub fn snapshot(&self) -> VehicleSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Start a navigation session toward `dest` (or just open the map when
    /// `None`)
    ///
    /// Forces follow mode, computes a route when a destination is given, and
    /// records it into the recent history. The history write is
    /// fire-and-forget: a failure is logged, never surfaced.
    pub async fn open_destination(&mut self, dest: Option<SavedLocation>) {
        self.active_destination = dest.clone();
        self.active_route = None;
        self.last_routed_from = None;
        self.follow.recenter();

        if let Some(loc) = dest {
            self.compute_route().await;
            if let Err(err) = self.history.record_recent(loc).await {
                warn!("failed to record recent destination: {err}");
            }
        }
    }

    /// End the navigation session; persisted locations are untouched
    pub fn close_navigation(&mut self) {
        self.active_destination = None;
        self.active_route = None;
        self.last_routed_from = None;
    }

    /// Request a route for the current position and destination
    ///
    /// No-op unless both are set. On failure the route becomes `None` and the
    /// map degrades to point markers; there is no retry and no partial route.
    pub async fn compute_route(&mut self) {
        let Some(pos) = self.snapshot.borrow().pos else {
            return;
        };
        let Some(dest) = self.active_destination.as_ref() else {
            return;
        };
        let target = dest.pos();
        self.active_route = self.routes.fetch_route(pos, target).await;
        self.last_routed_from = Some(pos);
    }

    /// Feed one event from the position watch
    pub async fn handle_gps(&mut self, event: GpsEvent) {
        match event {
            GpsEvent::Fault(err) => {
                self.estimator.reset();
                self.snapshot.send_modify(|s| {
                    s.gps_status = err.status();
                    s.speed_mps = 0.0;
                });
            }
            GpsEvent::Fix(sample) => {
                let speed = self.estimator.ingest(&sample);
                self.snapshot.send_modify(|s| {
                    s.pos = Some(sample.pos);
                    s.speed_mps = speed;
                    s.heading_deg = sample.heading_deg;
                    s.gps_status = GpsStatus::Granted;
                });
                if self.active_destination.is_some() && self.should_reroute(sample.pos) {
                    self.compute_route().await;
                }
            }
        }
        self.follow.tick(Instant::now());
    }

    fn should_reroute(&self, pos: LatLon) -> bool {
        match self.last_routed_from {
            None => true,
            Some(from) => haversine_distance(from, pos) >= REROUTE_THRESHOLD_M,
        }
    }

    /// Override the follow inactivity timeout (from [`RuntimeConfig`])
    ///
    /// [`RuntimeConfig`]: crate::config::RuntimeConfig
    pub fn set_follow_timeout(&mut self, timeout: std::time::Duration) {
        self.follow.set_timeout(timeout);
    }

    /// The user dragged/zoomed/scrolled the map
    pub fn on_map_interaction(&mut self) {
        self.follow.on_interaction(Instant::now());
    }

    /// The user tapped the recenter control
    pub fn recenter(&mut self) {
        self.follow.recenter();
    }

    /// Check the follow inactivity deadline; true when follow just resumed
    pub fn tick_follow(&mut self, now: Instant) -> bool {
        self.follow.tick(now)
    }

    /// Record a visibility change on the shared state
    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.snapshot.send_modify(|s| s.visibility = visibility);
    }

    /// Whether the camera is auto-tracking
    pub fn is_following(&self) -> bool {
        self.follow.is_following()
    }

    /// Current camera perspective
    pub fn perspective(&self) -> MapPerspective {
        self.follow.perspective()
    }

    /// Flip between driving and top-down perspectives
    pub fn toggle_perspective(&mut self) {
        self.follow.toggle_perspective();
    }

    /// Active destination, if a session is open
    pub fn active_destination(&self) -> Option<&SavedLocation> {
        self.active_destination.as_ref()
    }

    /// Active route, if one was computed
    pub fn active_route(&self) -> Option<&RouteData> {
        self.active_route.as_ref()
    }

    /// Smoothed speedometer value in the given unit
    pub fn display_speed(&self, unit: SpeedUnit) -> u32 {
        self.estimator.display_speed(unit)
    }

    /// Where the camera should move, per the follow rules
    pub fn camera_target(&self) -> Option<CameraTarget> {
        let pos = self.snapshot.borrow().pos;
        let coords = self.active_route.as_ref().map(|r| r.coordinates.as_slice());
        self.follow.camera_target(pos, coords)
    }
}
