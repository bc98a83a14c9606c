//! Tracking viewer
//!
//! The consumer side of a share link: polls the tracking endpoint at a fixed
//! cadence. A failed fetch surfaces as "connection lost"; there is no retry
//! beyond the poll loop itself, whose next scheduled attempt may recover.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::warn;

use crate::position::Visibility;
use crate::store::types::TrackingState;
use crate::store::StoreError;
use crate::task::ScheduledTask;

/// Fixed poll cadence, matching the relay
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Source of tracking entities, keyed by session id
pub trait TrackingFeed: Send + Sync {
    /// Fetch the last known state for a session; `NotFound` when it ended
    fn fetch_tracking(
        &self,
        tracking_id: &str,
    ) -> impl Future<Output = Result<TrackingState, StoreError>> + Send;
}

/// What the viewer UI shows
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerStatus {
    /// No response yet
    Connecting,
    /// Last successfully fetched state
    Live(TrackingState),
    /// A poll failed; stays until a later poll succeeds or the user leaves
    ConnectionLost,
}

/// Polling viewer over one tracking session
pub struct TrackingViewer<F: TrackingFeed> {
    feed: F,
    tracking_id: String,
    status: watch::Sender<ViewerStatus>,
}

impl<F: TrackingFeed + 'static> TrackingViewer<F> {
    /// Create a viewer for `tracking_id`
    pub fn new(feed: F, tracking_id: impl Into<String>) -> Self {
        let (status, _) = watch::channel(ViewerStatus::Connecting);
        Self {
            feed,
            tracking_id: tracking_id.into(),
            status,
        }
    }

    /// Session id being watched
    pub fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    /// Current status
    pub fn status(&self) -> ViewerStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to status changes
    pub fn subscribe(&self) -> watch::Receiver<ViewerStatus> {
        self.status.subscribe()
    }

    /// Run one poll; hidden pages skip it and keep the previous status
    pub async fn poll_once(&self, visibility: Visibility) {
        if visibility != Visibility::Visible {
            return;
        }
        match self.feed.fetch_tracking(&self.tracking_id).await {
            Ok(state) => {
                self.status.send_replace(ViewerStatus::Live(state));
            }
            Err(err) => {
                warn!("tracking poll failed: {err}");
                self.status.send_replace(ViewerStatus::ConnectionLost);
            }
        }
    }

    /// Spawn the poll loop: one poll immediately, then every `period`
    ///
    /// The returned task owns the loop; dropping it stops polling.
    pub fn spawn_poll(
        self: &Arc<Self>,
        period: Duration,
        visibility: watch::Receiver<Visibility>,
    ) -> ScheduledTask {
        let viewer = Arc::clone(self);
        ScheduledTask::every_starting_now(period, move || {
            let viewer = Arc::clone(&viewer);
            let vis = *visibility.borrow();
            async move { viewer.poll_once(vis).await }
        })
    }
}
