//! Snapshot caching with single-rebuild collapse and stale-on-error fallback.
//!
//! [`SnapshotCache`] is a guarded memoized computation: "compute once under a
//! lock, read the fast path without one". Each provider owns two independent
//! instances (content and directory snapshots) so a rebuild of one never
//! blocks readers of the other.
//!
//! # Refresh protocol
//!
//! - **Fast path**: an unexpired snapshot is returned by cloning an `Arc`
//!   out of a read guard; no async lock is touched. Readers that arrive
//!   while a rebuild is in flight still get the previous snapshot.
//! - **Slow path**: the rebuild mutex is acquired with a bounded timeout and
//!   the fast-path condition is re-checked inside the lock (double-checked),
//!   collapsing N concurrent misses into one `load` invocation.
//! - **Stale-on-error**: when a reload fails but an earlier snapshot exists
//!   (even an expired one), the stale snapshot is served and the failure is
//!   logged (availability over freshness). With no earlier snapshot the
//!   error propagates.
//! - **Timeout degradation**: when the rebuild lock cannot be acquired in
//!   time, the last known snapshot is returned; only a never-loaded cache
//!   surfaces [`RepoError::CacheLockTimeout`].
//!
//! The snapshot slot is only written after a load fully completes, so a
//! cancelled (dropped) rebuild future leaves the previous snapshot
//! authoritative, and readers holding a captured `Arc` always see a
//! consistent view.

use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::core::{RepoError, Result};

/// Default snapshot lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default bound on rebuild-lock acquisition.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

struct CacheSlot<T> {
    snapshot: Arc<T>,
    expires_at: Instant,
}

/// A memoized snapshot with TTL expiry and serialized rebuilds.
pub struct SnapshotCache<T> {
    name: &'static str,
    ttl: Duration,
    lock_timeout: Duration,
    slot: Arc<RwLock<Option<CacheSlot<T>>>>,
    rebuild: Mutex<()>,
}

/// A detached handle that can invalidate a cache without borrowing it.
///
/// Used by background tasks (the change watcher) whose lifetime is not tied
/// to a borrow of the owning provider.
pub struct InvalidationHandle<T> {
    slot: Arc<RwLock<Option<CacheSlot<T>>>>,
}

impl<T> Clone for InvalidationHandle<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> InvalidationHandle<T> {
    /// Clear the stored snapshot; the next read must reload.
    pub fn invalidate(&self) {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl<T> std::fmt::Debug for SnapshotCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<T> SnapshotCache<T> {
    /// Create a cache instance.
    ///
    /// `name` identifies the instance in logs and timeout errors ("content",
    /// "directories").
    #[must_use]
    pub fn new(name: &'static str, ttl: Duration, lock_timeout: Duration) -> Self {
        Self {
            name,
            ttl,
            lock_timeout,
            slot: Arc::new(RwLock::new(None)),
            rebuild: Mutex::new(()),
        }
    }

    /// A detached invalidation handle for background tasks.
    #[must_use]
    pub fn invalidation_handle(&self) -> InvalidationHandle<T> {
        InvalidationHandle {
            slot: Arc::clone(&self.slot),
        }
    }

    /// Return the current snapshot, loading it through `load` when missing,
    /// expired, or `force_refresh` is set.
    ///
    /// N concurrent callers against an empty cache invoke `load` exactly
    /// once; all receive the same `Arc`.
    ///
    /// # Errors
    ///
    /// Propagates the `load` error only when no earlier snapshot exists;
    /// returns [`RepoError::CacheLockTimeout`] when the rebuild lock times
    /// out on a never-loaded cache.
    pub async fn get_or_load<F, Fut>(&self, force_refresh: bool, load: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !force_refresh && let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }

        let guard = match timeout(self.lock_timeout, self.rebuild.lock()).await {
            Ok(guard) => guard,
            Err(_) => {
                warn!(
                    cache = self.name,
                    timeout_secs = self.lock_timeout.as_secs(),
                    "rebuild lock timed out, degrading to last known snapshot"
                );
                return self
                    .last_known()
                    .ok_or(RepoError::CacheLockTimeout { cache: self.name });
            }
        };

        // Double-checked: a concurrent rebuild may have finished while this
        // caller waited on the lock.
        if !force_refresh && let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }

        debug!(cache = self.name, force_refresh, "loading snapshot");
        match load().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.write_slot() = Some(CacheSlot {
                    snapshot: Arc::clone(&snapshot),
                    expires_at: Instant::now() + self.ttl,
                });
                drop(guard);
                Ok(snapshot)
            }
            Err(err) => match self.last_known() {
                Some(stale) => {
                    warn!(
                        cache = self.name,
                        error = %err,
                        "reload failed, serving stale snapshot"
                    );
                    Ok(stale)
                }
                None => Err(err),
            },
        }
    }

    /// Clear the stored snapshot; the next call must reload.
    ///
    /// After invalidation there is no stale snapshot to fall back to, so a
    /// failing reload propagates its error (never-loaded semantics).
    pub fn invalidate(&self) {
        *self.write_slot() = None;
        debug!(cache = self.name, "invalidated");
    }

    /// Whether a snapshot (fresh or expired) is currently stored.
    #[must_use]
    pub fn has_snapshot(&self) -> bool {
        self.read_slot().is_some()
    }

    // Unexpired snapshot, if any.
    fn fresh(&self) -> Option<Arc<T>> {
        self.read_slot()
            .as_ref()
            .filter(|slot| slot.expires_at > Instant::now())
            .map(|slot| Arc::clone(&slot.snapshot))
    }

    // Any stored snapshot, expired or not.
    fn last_known(&self) -> Option<Arc<T>> {
        self.read_slot()
            .as_ref()
            .map(|slot| Arc::clone(&slot.snapshot))
    }

    // The slot lock is held only for pointer reads/swaps and never across an
    // await, so a poisoned lock can only mean a panic mid-swap; recover the
    // inner value rather than cascading the panic.
    fn read_slot(&self) -> RwLockReadGuard<'_, Option<CacheSlot<T>>> {
        self.slot.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_slot(&self) -> RwLockWriteGuard<'_, Option<CacheSlot<T>>> {
        self.slot.write().unwrap_or_else(|e| e.into_inner())
    }
}
