//! Background state polling.
//!
//! One task per robot polls the state cache on a configurable interval,
//! pushes observed changes into a [`StatusSink`] and backs off
//! quadratically while the cloud is failing. Interval changes arrive
//! over a watch channel and take effect without restarting the task, so
//! there is never more than one timer per robot. An overlapping poll
//! request (manual refresh racing the timer) is skipped, not queued.

mod health;
mod sink;

pub use health::{PollingHealth, MAX_POLL_INTERVAL};
pub use sink::StatusSink;

use crate::cache::StateCache;
use crate::nucleo::RobotApi;
use crate::status::{derive, DerivedState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Change tracking between polls.
struct PollInner {
    health: PollingHealth,
    last: Option<DerivedState>,
    unavailable: bool,
}

/// Poll driver for one robot.
pub struct PollScheduler<A, S> {
    cache: Arc<StateCache<A>>,
    sink: Arc<S>,
    polling: AtomicBool,
    inner: Mutex<PollInner>,
}

impl<A, S> PollScheduler<A, S>
where
    A: RobotApi + 'static,
    S: StatusSink + 'static,
{
    pub fn new(cache: Arc<StateCache<A>>, sink: Arc<S>, base_interval: Duration) -> Self {
        Self {
            cache,
            sink,
            polling: AtomicBool::new(false),
            inner: Mutex::new(PollInner {
                health: PollingHealth::new(base_interval),
                last: None,
                unavailable: false,
            }),
        }
    }

    /// Interval until the next scheduled poll.
    pub fn current_interval(&self) -> Duration {
        self.inner.lock().expect("poll state lock poisoned").health.current_interval()
    }

    /// Runs one poll cycle. Returns `false` when another poll was
    /// already in progress and this one was skipped.
    ///
    /// Fetch errors are absorbed here: they feed the backoff and the
    /// availability callbacks but never propagate to the caller.
    pub async fn poll_once(&self) -> bool {
        if self.polling.swap(true, Ordering::SeqCst) {
            debug!("poll already in progress, skipping");
            return false;
        }

        // Release the lock even if this future is dropped mid-fetch
        // (e.g. the caller wrapped the poll in a timeout); otherwise
        // every later poll would be skipped forever.
        struct ReleaseLock<'a>(&'a AtomicBool);
        impl Drop for ReleaseLock<'_> {
            fn drop(&mut self) {
                self.0.store(false, Ordering::SeqCst);
            }
        }
        let _release = ReleaseLock(&self.polling);

        let result = self.cache.get().await;

        {
            let mut inner = self.inner.lock().expect("poll state lock poisoned");
            match result {
                Ok(raw) => {
                    inner.health.record_success();
                    self.apply(&mut inner, derive(&raw));
                }
                Err(e) => {
                    inner.health.record_failure();
                    warn!(
                        error = %e,
                        consecutive_errors = inner.health.consecutive_errors(),
                        next_poll = ?inner.health.current_interval(),
                        "state poll failed"
                    );
                    if !inner.unavailable {
                        inner.unavailable = true;
                        self.sink.unavailable(&e.to_string());
                    }
                }
            }
        }

        true
    }

    fn apply(&self, inner: &mut PollInner, derived: DerivedState) {
        match &derived.unavailable_reason {
            Some(reason) => {
                if !inner.unavailable {
                    inner.unavailable = true;
                    self.sink.unavailable(reason);
                }
            }
            None => {
                if inner.unavailable {
                    inner.unavailable = false;
                    self.sink.available();
                }
            }
        }

        let status_changed = inner.last.as_ref().map(|l| l.status) != Some(derived.status);
        let battery_changed =
            inner.last.as_ref().map(|l| l.battery_percent) != Some(derived.battery_percent);

        if status_changed {
            debug!(status = %derived.status, "robot status changed");
            self.sink.status_changed(derived.status);
        }
        if battery_changed {
            self.sink.battery_changed(derived.battery_percent);
        }
        inner.last = Some(derived);
    }

    /// Starts the poll loop. Polls immediately, then on the configured
    /// interval until the handle is stopped.
    pub fn start(self: Arc<Self>) -> PollHandle {
        let base = self.inner.lock().expect("poll state lock poisoned").health.base();
        let (interval_tx, interval_rx) = watch::channel(base);
        let cancel = CancellationToken::new();
        let join = tokio::spawn(run_loop(Arc::clone(&self), interval_rx, cancel.clone()));

        PollHandle {
            cancel,
            interval_tx,
            join,
        }
    }
}

enum Wake {
    Cancelled,
    Tick,
    IntervalChanged,
    IntervalClosed,
}

async fn run_loop<A, S>(
    scheduler: Arc<PollScheduler<A, S>>,
    mut interval_rx: watch::Receiver<Duration>,
    cancel: CancellationToken,
) where
    A: RobotApi + 'static,
    S: StatusSink + 'static,
{
    info!(interval = ?*interval_rx.borrow(), "poll loop started");
    let mut watch_open = true;

    scheduler.poll_once().await;

    loop {
        let delay = scheduler.current_interval();

        let wake = tokio::select! {
            _ = cancel.cancelled() => Wake::Cancelled,
            _ = tokio::time::sleep(delay) => Wake::Tick,
            changed = interval_rx.changed(), if watch_open => match changed {
                Ok(()) => Wake::IntervalChanged,
                Err(_) => Wake::IntervalClosed,
            },
        };

        match wake {
            Wake::Cancelled => break,
            Wake::Tick => {
                scheduler.poll_once().await;
            }
            Wake::IntervalChanged => {
                let base = *interval_rx.borrow_and_update();
                info!(interval = ?base, "poll interval changed");
                scheduler
                    .inner
                    .lock()
                    .expect("poll state lock poisoned")
                    .health
                    .set_base(base);
            }
            Wake::IntervalClosed => {
                // Handle dropped without cancelling; keep the last interval.
                watch_open = false;
            }
        }
    }
    info!("poll loop stopped");
}

/// Control handle for a running poll loop.
pub struct PollHandle {
    cancel: CancellationToken,
    interval_tx: watch::Sender<Duration>,
    join: JoinHandle<()>,
}

impl PollHandle {
    /// Changes the base poll interval of the running loop.
    pub fn set_interval(&self, interval: Duration) {
        // Receiver outlives the loop; send only fails after stop().
        let _ = self.interval_tx.send(interval);
    }

    /// Stops the loop and waits for the task to finish.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.join.await;
    }
}
