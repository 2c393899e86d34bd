//! # Result Cache
//!
//! TTL cache of the most recent [`HealthReport`] per [`DetailLevel`], with
//! single-flight recomputation.
//!
//! ## State machine (per detail level)
//!
//! ```text
//!   Empty ──► Computing ──► Ready(ttl) ──► Stale ──► Computing ──► …
//! ```
//!
//! `Computing` admits any number of observers but exactly one executor. The
//! executor runs on its own spawned task, so the pass completes and is stored
//! even if every caller that was waiting on it goes away.
//!
//! ## Locking
//!
//! One short `parking_lot::Mutex` critical section per call decides between
//! "fresh hit", "attach to in-flight pass" and "start a new pass". The lock is
//! never held across an `.await` and never held while a probe runs. A cache
//! entry is only ever replaced wholesale, never edited in place.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use super::types::{DetailLevel, HealthReport};
use crate::error::{HealthError, HealthResult};

/// Default report time-to-live
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

type PassFuture = Shared<BoxFuture<'static, HealthResult<Arc<HealthReport>>>>;

/// A stored report and its expiry
#[derive(Debug)]
struct CacheEntry {
    report: Arc<HealthReport>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Observable cache state for one detail level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Computing,
    Ready,
    Stale,
}

#[derive(Default)]
struct CacheSlot {
    entry: Option<Arc<CacheEntry>>,
    in_flight: Option<PassFuture>,
}

struct CacheInner {
    ttl: Duration,
    slots: Mutex<HashMap<DetailLevel, CacheSlot>>,
}

/// Thread-safe report cache, cheap to clone
#[derive(Clone)]
pub struct ResultCache {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("ttl_ms", &(self.inner.ttl.as_millis() as u64))
            .finish()
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl ResultCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                ttl,
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Return a fresh report, or compute one with the cache's own TTL
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: DetailLevel,
        compute: F,
    ) -> HealthResult<Arc<HealthReport>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = HealthResult<HealthReport>> + Send + 'static,
    {
        self.get_or_compute_with_ttl(key, self.inner.ttl, compute)
            .await
    }

    /// Return a fresh report for `key`, or compute one
    ///
    /// For any burst of concurrent calls during one stale window, `compute`
    /// is invoked exactly once and every caller receives the same report.
    /// A failed computation leaves the previous entry (if any) in place and
    /// is not cached.
    pub async fn get_or_compute_with_ttl<F, Fut>(
        &self,
        key: DetailLevel,
        ttl: Duration,
        compute: F,
    ) -> HealthResult<Arc<HealthReport>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = HealthResult<HealthReport>> + Send + 'static,
    {
        let pass = {
            let mut slots = self.inner.slots.lock();
            let slot = slots.entry(key).or_default();

            if let Some(entry) = slot.entry.as_ref().filter(|e| e.is_fresh(Instant::now())) {
                debug!(detail = %key, "Health report served from cache");
                return Ok(Arc::clone(&entry.report));
            }

            match &slot.in_flight {
                Some(pass) => {
                    debug!(detail = %key, "Attaching to in-flight health pass");
                    pass.clone()
                }
                None => {
                    let pass = self.start_pass(key, ttl, compute());
                    slot.in_flight = Some(pass.clone());
                    pass
                }
            }
        };

        pass.await
    }

    /// Spawn the executor task for one pass
    ///
    /// Called with the slot lock held; the spawned task only takes the lock
    /// after the caller has installed the in-flight marker and released it.
    fn start_pass<Fut>(&self, key: DetailLevel, ttl: Duration, compute: Fut) -> PassFuture
    where
        Fut: Future<Output = HealthResult<HealthReport>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);

        let handle = tokio::spawn(async move {
            let guard = PassGuard::new(inner, key);
            let outcome = compute.await.map(Arc::new);
            guard.seal(ttl, &outcome);
            outcome
        });

        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    error!(detail = %key, error = %join_error, "Health pass task did not complete");
                    Err(HealthError::PassAborted(join_error.to_string()))
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Latest stored report regardless of freshness
    pub fn peek(&self, key: DetailLevel) -> Option<Arc<HealthReport>> {
        self.inner
            .slots
            .lock()
            .get(&key)
            .and_then(|slot| slot.entry.as_ref())
            .map(|entry| Arc::clone(&entry.report))
    }

    pub fn state(&self, key: DetailLevel) -> CacheState {
        let slots = self.inner.slots.lock();
        let Some(slot) = slots.get(&key) else {
            return CacheState::Empty;
        };

        if slot.in_flight.is_some() {
            return CacheState::Computing;
        }

        match &slot.entry {
            None => CacheState::Empty,
            Some(entry) if entry.is_fresh(Instant::now()) => CacheState::Ready,
            Some(_) => CacheState::Stale,
        }
    }

    /// Drop the stored report for `key`; an in-flight pass is unaffected
    pub fn invalidate(&self, key: DetailLevel) {
        if let Some(slot) = self.inner.slots.lock().get_mut(&key) {
            slot.entry = None;
        }
    }
}

/// Clears the in-flight marker if the executor task unwinds or is dropped
/// before sealing its pass
struct PassGuard {
    inner: Arc<CacheInner>,
    key: DetailLevel,
    sealed: bool,
}

impl PassGuard {
    fn new(inner: Arc<CacheInner>, key: DetailLevel) -> Self {
        Self {
            inner,
            key,
            sealed: false,
        }
    }

    fn seal(mut self, ttl: Duration, outcome: &HealthResult<Arc<HealthReport>>) {
        self.inner.complete(self.key, ttl, outcome);
        self.sealed = true;
    }
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        if self.sealed {
            return;
        }
        warn!(detail = %self.key, "Health pass ended without a result; clearing in-flight marker");
        if let Some(slot) = self.inner.slots.lock().get_mut(&self.key) {
            slot.in_flight = None;
        }
    }
}

impl CacheInner {
    /// Seal a finished pass: swap in the new entry and clear the marker
    fn complete(&self, key: DetailLevel, ttl: Duration, outcome: &HealthResult<Arc<HealthReport>>) {
        let mut slots = self.slots.lock();
        let slot = slots.entry(key).or_default();
        slot.in_flight = None;

        if let Ok(report) = outcome {
            slot.entry = Some(Arc::new(CacheEntry {
                report: Arc::clone(report),
                expires_at: Instant::now() + ttl,
            }));
        }
    }
}
