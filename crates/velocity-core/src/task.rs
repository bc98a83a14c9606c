//! Scheduled task abstraction
//!
//! All repeating timers in the system (live-share relay, tracking poll) run
//! through [`ScheduledTask`]: a spawned loop paired with a cancellation token
//! that is cancelled on drop, so no interval can outlive its owner. Background
//! tasks are counted so tests can assert nothing leaked after teardown.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

static ACTIVE_TASKS: AtomicUsize = AtomicUsize::new(0);

/// Number of background tasks currently alive
pub fn active_tasks() -> usize {
    ACTIVE_TASKS.load(Ordering::SeqCst)
}

struct TaskGuard;

impl TaskGuard {
    fn new() -> Self {
        ACTIVE_TASKS.fetch_add(1, Ordering::SeqCst);
        TaskGuard
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        ACTIVE_TASKS.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Spawn a background future counted in [`active_tasks`]
pub(crate) fn spawn_tracked<F>(fut: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let guard = TaskGuard::new();
    tokio::spawn(async move {
        let _guard = guard;
        fut.await;
    })
}

/// A cancellable repeating background task
///
/// Dropping the handle cancels the loop; [`shutdown`](Self::shutdown) waits
/// for it to finish.
pub struct ScheduledTask {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Run `f` every `period`, with the first run one period from now
    /// (classic repeating-interval semantics)
    pub fn every<F, Fut>(period: Duration, f: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let start = tokio::time::Instant::now() + period;
        Self::spawn_loop(tokio::time::interval_at(start, period), f)
    }

    /// Run `f` immediately and then every `period`
    pub fn every_starting_now<F, Fut>(period: Duration, f: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        Self::spawn_loop(tokio::time::interval(period), f)
    }

    fn spawn_loop<F, Fut>(mut ticker: tokio::time::Interval, mut f: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = spawn_tracked(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => f().await,
                }
            }
        });
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Request cancellation without waiting for the loop to exit
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the background loop has exited
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Cancel and wait for the loop to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
