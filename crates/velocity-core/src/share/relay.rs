//! Live-share relay
//!
//! While sharing is active, pushes the fused position/speed/heading to the
//! tracking endpoint at a fixed cadence. A tick only goes out when the UI is
//! visible, GPS is granted and a position exists; otherwise it is skipped
//! silently. Skipping is battery/backpressure policy, not a fault, and a
//! failed send is simply retried by the next tick.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::nav::session::VehicleSnapshot;
use crate::position::{GpsStatus, Visibility};
use crate::store::StoreError;
use crate::task::ScheduledTask;

/// Fixed relay cadence
pub const RELAY_INTERVAL: Duration = Duration::from_secs(10);

/// Payload POSTed to the tracking endpoint each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveShareTick {
    /// Vehicle latitude
    pub lat: f64,
    /// Vehicle longitude
    pub lon: f64,
    /// Raw speed in m/s
    pub speed: f64,
    /// Heading in degrees; 0 when unknown
    pub heading: f64,
}

/// Sink for relay ticks; the backend upserts last-write-wins per session id
pub trait TickSink: Send + Sync {
    /// Push one tick for `tracking_id`
    fn push_tick(
        &self,
        tracking_id: &str,
        tick: LiveShareTick,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Build the payload for one relay tick, or `None` when the gate fails
pub fn prepare_tick(snapshot: &VehicleSnapshot) -> Option<LiveShareTick> {
    if snapshot.visibility != Visibility::Visible {
        return None;
    }
    if snapshot.gps_status != GpsStatus::Granted {
        return None;
    }
    let pos = snapshot.pos?;
    Some(LiveShareTick {
        lat: pos.lat,
        lon: pos.lon,
        speed: snapshot.speed_mps,
        heading: snapshot.heading_deg.unwrap_or(0.0),
    })
}

struct RelayInner<S> {
    sink: S,
    vehicle: watch::Receiver<VehicleSnapshot>,
    tracking_id: Mutex<Option<String>>,
}

impl<S: TickSink> RelayInner<S> {
    async fn tick(&self) {
        let id = { self.tracking_id.lock().unwrap().clone() };
        let Some(id) = id else {
            return;
        };
        let snapshot = self.vehicle.borrow().clone();
        let Some(tick) = prepare_tick(&snapshot) else {
            debug!("relay tick skipped (hidden, no permission or no fix)");
            return;
        };
        if let Err(err) = self.sink.push_tick(&id, tick).await {
            // Next tick is the retry.
            debug!("live-share send failed: {err}");
        }
    }
}

/// Sharing state machine: `Stopped` until started, `Sharing` until stopped
///
/// Starting generates a fresh random session id and owns the relay timer;
/// stopping (or dropping the relay) cancels it.
pub struct LiveShareRelay<S: TickSink + 'static> {
    inner: Arc<RelayInner<S>>,
    timer: Mutex<Option<ScheduledTask>>,
}

impl<S: TickSink + 'static> LiveShareRelay<S> {
    /// Create a stopped relay reading snapshots from `vehicle`
    pub fn new(sink: S, vehicle: watch::Receiver<VehicleSnapshot>) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                sink,
                vehicle,
                tracking_id: Mutex::new(None),
            }),
            timer: Mutex::new(None),
        }
    }

    /// Start sharing at the standard cadence; returns the new session id
    pub fn start(&self) -> String {
        self.start_with_interval(RELAY_INTERVAL)
    }

    /// Start sharing with a custom cadence; returns the new session id
    ///
    /// Starting while already sharing rotates the session id and restarts
    /// the timer.
    pub fn start_with_interval(&self, period: Duration) -> String {
        let id = Uuid::new_v4().to_string();
        *self.inner.tracking_id.lock().unwrap() = Some(id.clone());

        let inner = Arc::clone(&self.inner);
        let task = ScheduledTask::every(period, move || {
            let inner = Arc::clone(&inner);
            async move { inner.tick().await }
        });
        *self.timer.lock().unwrap() = Some(task);
        id
    }

    /// Stop sharing: clear the session id and cancel the timer
    pub fn stop(&self) {
        *self.inner.tracking_id.lock().unwrap() = None;
        // Dropping the task cancels its loop.
        *self.timer.lock().unwrap() = None;
    }

    /// Whether a sharing session is active
    pub fn is_sharing(&self) -> bool {
        self.inner.tracking_id.lock().unwrap().is_some()
    }

    /// Current session id, when sharing
    pub fn tracking_id(&self) -> Option<String> {
        self.inner.tracking_id.lock().unwrap().clone()
    }
}
