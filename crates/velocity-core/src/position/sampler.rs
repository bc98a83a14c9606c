//! Geolocation sampler
//!
//! Wraps a continuous position stream behind a scoped subscription handle.
//! The forwarding task is acquired when the watch is spawned and released on
//! shutdown or drop, and it stops pulling from the source while the UI is
//! hidden so a backgrounded dashboard does not burn battery on fixes nobody
//! sees.

use std::future::Future;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{GpsEvent, Visibility};
use crate::task::spawn_tracked;

/// Buffered events between the source task and the consumer
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// A continuous source of position events
///
/// Implementations wrap whatever the platform offers (a geolocation watch, a
/// replayed log, the demo simulator). `None` means the stream ended.
pub trait PositionStream: Send + 'static {
    /// Produce the next event, suspending until one is available
    fn next_event(&mut self) -> impl Future<Output = Option<GpsEvent>> + Send;
}

/// Scoped handle over a running position subscription
///
/// Holds the single active subscription; dropping the handle (or calling
/// [`shutdown`](Self::shutdown)) cancels the forwarding task.
pub struct GpsWatch {
    events: mpsc::Receiver<GpsEvent>,
    visibility: watch::Sender<Visibility>,
    cancel: CancellationToken,
}

impl GpsWatch {
    /// Spawn the forwarding task for `stream` and return the handle
    pub fn spawn<S: PositionStream>(mut stream: S) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (vis_tx, mut vis_rx) = watch::channel(Visibility::Visible);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        spawn_tracked(async move {
            loop {
                // Hold off while hidden; resume when visibility returns.
                while *vis_rx.borrow() == Visibility::Hidden {
                    tokio::select! {
                        _ = token.cancelled() => return,
                        changed = vis_rx.changed() => {
                            if changed.is_err() {
                                return;
                            }
                        }
                    }
                }

                tokio::select! {
                    _ = token.cancelled() => return,
                    event = stream.next_event() => match event {
                        Some(event) => {
                            if tx.send(event).await.is_err() {
                                return;
                            }
                        }
                        None => {
                            debug!("position stream ended");
                            return;
                        }
                    }
                }
            }
        });

        Self {
            events: rx,
            visibility: vis_tx,
            cancel,
        }
    }

    /// Receive the next event; `None` once the stream ended or was shut down
    pub async fn recv(&mut self) -> Option<GpsEvent> {
        self.events.recv().await
    }

    /// Tell the watch whether the UI is visible
    ///
    /// While hidden the source is not polled at all.
    pub fn set_visibility(&self, visibility: Visibility) {
        let _ = self.visibility.send(visibility);
    }

    /// Cancel the subscription
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for GpsWatch {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLon;
    use crate::position::{GpsError, PositionSample};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Emits a fixed list of events, one per poll
    struct ScriptedStream {
        events: Vec<GpsEvent>,
    }

    impl PositionStream for ScriptedStream {
        fn next_event(&mut self) -> impl Future<Output = Option<GpsEvent>> + Send {
            let event = if self.events.is_empty() {
                None
            } else {
                Some(self.events.remove(0))
            };
            async move {
                match event {
                    Some(e) => Some(e),
                    None => {
                        // Keep an exhausted stream pending instead of ending it
                        // so shutdown paths stay observable.
                        std::future::pending::<()>().await;
                        None
                    }
                }
            }
        }
    }

    fn fix(lat: f64, lon: f64, ts: u64) -> GpsEvent {
        GpsEvent::Fix(PositionSample {
            pos: LatLon::new(lat, lon),
            speed_mps: Some(1.0),
            heading_deg: None,
            timestamp_ms: ts,
        })
    }

    #[tokio::test]
    async fn test_forwards_events_in_order() {
        let stream = ScriptedStream {
            events: vec![
                fix(40.0, -74.0, 0),
                fix(40.001, -74.0, 1_000),
                GpsEvent::Fault(GpsError::PermissionDenied),
            ],
        };
        let mut gps = GpsWatch::spawn(stream);

        assert_eq!(gps.recv().await, Some(fix(40.0, -74.0, 0)));
        assert_eq!(gps.recv().await, Some(fix(40.001, -74.0, 1_000)));
        assert_eq!(
            gps.recv().await,
            Some(GpsEvent::Fault(GpsError::PermissionDenied))
        );
    }

    /// Emits a fix every second and counts how often it is polled
    struct CountingStream {
        polls: Arc<AtomicUsize>,
    }

    impl PositionStream for CountingStream {
        fn next_event(&mut self) -> impl Future<Output = Option<GpsEvent>> + Send {
            self.polls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Some(fix(40.0, -74.0, 0))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_watch_stops_polling_the_source() {
        let polls = Arc::new(AtomicUsize::new(0));
        let mut gps = GpsWatch::spawn(CountingStream {
            polls: Arc::clone(&polls),
        });

        assert!(gps.recv().await.is_some());
        gps.set_visibility(Visibility::Hidden);

        // Let any in-flight poll drain, then confirm the source sits idle.
        tokio::time::sleep(Duration::from_secs(5)).await;
        let while_hidden = polls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(polls.load(Ordering::SeqCst), while_hidden);

        gps.set_visibility(Visibility::Visible);
        assert!(gps.recv().await.is_some());
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(polls.load(Ordering::SeqCst) > while_hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_ends_stream() {
        let before = crate::task::active_tasks();
        let stream = ScriptedStream { events: vec![] };
        let mut gps = GpsWatch::spawn(stream);
        gps.shutdown();
        assert_eq!(gps.recv().await, None);
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(crate::task::active_tasks(), before);
    }
}
