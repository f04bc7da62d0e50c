//! Time-bounded state cache with request coalescing.
//!
//! Bounds the rate of remote state queries: reads within the TTL window
//! return the last snapshot without I/O, and concurrent readers during a
//! miss join the one in-flight fetch instead of issuing duplicates.
//! Commands that change robot state invalidate the entry so the next
//! read never serves pre-command data.

use crate::nucleo::{ApiError, RobotApi};
use crate::robot::RawRobotState;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Default snapshot TTL. Long enough to absorb per-flow-trigger storms,
/// short enough that a command's effect shows up within a poll cycle or two.
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(3);

type FetchResult = Result<Arc<RawRobotState>, ApiError>;

/// One cached snapshot and when it was fetched.
struct CachedState {
    snapshot: Arc<RawRobotState>,
    fetched_at: Instant,
}

#[derive(Default)]
struct CacheInner {
    entry: Option<CachedState>,
    /// Bumped by `invalidate`; a fetch only stores its snapshot if the
    /// generation is unchanged since it started.
    generation: u64,
    /// Present while a fetch is in flight; waiters subscribe here.
    in_flight: Option<broadcast::Sender<FetchResult>>,
}

/// What a `get` on a cold or expired entry has to do, decided under the
/// lock and acted on after it is released.
enum MissPath {
    Lead { generation: u64 },
    Wait(broadcast::Receiver<FetchResult>),
}

/// Per-robot state cache wrapping a [`RobotApi`].
///
/// The mutex is held only for bookkeeping, never across the remote call,
/// so readers observe either the old entry or the new one, nothing in
/// between.
pub struct StateCache<A> {
    api: Arc<A>,
    ttl: Duration,
    inner: Mutex<CacheInner>,
}

impl<A: RobotApi> StateCache<A> {
    /// Creates a cache with the default TTL.
    pub fn new(api: Arc<A>) -> Self {
        Self::with_ttl(api, DEFAULT_STATE_TTL)
    }

    /// Creates a cache with a custom TTL.
    pub fn with_ttl(api: Arc<A>, ttl: Duration) -> Self {
        Self {
            api,
            ttl,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// The API client this cache wraps.
    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    /// Returns the current snapshot, fetching if the entry is missing or
    /// expired.
    ///
    /// Concurrent calls during a miss are coalesced: exactly one remote
    /// fetch runs and every caller receives its result.
    pub async fn get(&self) -> FetchResult {
        // The lock scope ends before any await so the returned future
        // stays Send.
        let miss = {
            let mut inner = self.inner.lock().expect("state cache lock poisoned");

            if let Some(entry) = &inner.entry {
                if entry.fetched_at.elapsed() < self.ttl {
                    trace!("state cache hit");
                    return Ok(Arc::clone(&entry.snapshot));
                }
            }

            match &inner.in_flight {
                Some(tx) => {
                    trace!("state fetch already in flight, waiting for result");
                    MissPath::Wait(tx.subscribe())
                }
                None => {
                    let (tx, _) = broadcast::channel(1);
                    inner.in_flight = Some(tx);
                    MissPath::Lead {
                        generation: inner.generation,
                    }
                }
            }
        };

        match miss {
            MissPath::Lead { generation } => self.fetch_and_publish(generation).await,
            MissPath::Wait(mut rx) => match rx.recv().await {
                Ok(result) => result,
                // The leading fetch was dropped before completing.
                Err(_) => Err(ApiError::Transport(
                    "in-flight state fetch was cancelled".to_string(),
                )),
            },
        }
    }

    /// Forces the next `get` to bypass the cache regardless of TTL.
    ///
    /// Called after any command that is expected to change robot state.
    /// Also discards the snapshot of any fetch currently in flight: it
    /// was started before the command and must not be served afterwards.
    pub fn invalidate(&self) {
        let mut inner = self.inner.lock().expect("state cache lock poisoned");
        inner.generation = inner.generation.wrapping_add(1);
        if inner.entry.take().is_some() {
            debug!("state cache invalidated");
        }
    }

    async fn fetch_and_publish(&self, started_generation: u64) -> FetchResult {
        // If this future is dropped mid-fetch, clear the in-flight slot so
        // waiters fail fast instead of hanging on a sender nobody owns.
        struct ClearInFlight<'a> {
            inner: &'a Mutex<CacheInner>,
            armed: bool,
        }
        impl Drop for ClearInFlight<'_> {
            fn drop(&mut self) {
                if self.armed {
                    if let Ok(mut inner) = self.inner.lock() {
                        inner.in_flight = None;
                    }
                }
            }
        }

        let mut clear = ClearInFlight {
            inner: &self.inner,
            armed: true,
        };

        let result = self.api.fetch_state().await.map(Arc::new);
        clear.armed = false;

        let mut inner = self.inner.lock().expect("state cache lock poisoned");
        // An invalidation while this fetch was in flight means the
        // snapshot predates a command; hand it to waiters but do not
        // cache it.
        if inner.generation == started_generation {
            if let Ok(snapshot) = &result {
                inner.entry = Some(CachedState {
                    snapshot: Arc::clone(snapshot),
                    fetched_at: Instant::now(),
                });
            }
        }
        if let Some(tx) = inner.in_flight.take() {
            // Waiters may have been dropped; a send error is fine.
            let _ = tx.send(result.clone());
        }
        result
    }
}
