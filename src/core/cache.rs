//! Read-through memo cache with per-call time-to-live
//!
//! Values are stored in a bounded LRU map together with the instant they were
//! produced. A lookup younger than the caller's ttl is served from memory; an
//! older one re-runs the producer. If the producer fails the cache hands back
//! the last good value, or the caller's default when there is none, so a
//! flaky upstream degrades a view instead of breaking it.
//!
//! The lock is never held while a producer runs. Two concurrent misses for
//! the same key may therefore both produce; the later write wins.

use lru::LruCache;
use std::{
    fmt::{Debug, Display},
    future::Future,
    hash::Hash,
    num::NonZeroUsize,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};


/// How a value was obtained by [`TtlCache::cached_call_with_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from memory, still within ttl.
    Hit,
    /// No entry existed; the producer ran and succeeded.
    Miss,
    /// The entry had expired; the producer ran and succeeded.
    Refreshed,
    /// The producer failed; the expired value was served.
    Stale,
    /// The producer failed and nothing was cached; the default was served.
    Fallback,
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    refreshed_at: Instant,
}

/// Bounded key -> (value, timestamp) store.
pub struct TtlCache<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    entries: Arc<Mutex<LruCache<K, CacheEntry<V>>>>,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl<K, V> Clone for TtlCache<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            capacity: self.capacity,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone + Debug,
    V: Clone,
{
    /// Create a cache holding at most `capacity` entries, timed by the system clock.
    pub fn new(capacity: usize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    /// Create a cache timed by `clock`.
    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(cap))),
            capacity: cap.get(),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// The stored value if it was produced less than `ttl` ago.
    pub fn get_fresh(&self, key: &K, ttl: Duration) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.refreshed_at) < ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// The stored value regardless of age.
    pub fn get_stale(&self, key: &K) -> Option<V> {
        self.lock().get(key).map(|entry| entry.value.clone())
    }

    /// Store `value` under `key`, stamped with the current time.
    pub fn put(&self, key: K, value: V) {
        let refreshed_at = self.clock.now();
        self.lock().put(
            key,
            CacheEntry {
                value,
                refreshed_at,
            },
        );
    }

    /// Drop one entry so the next call re-produces it.
    pub fn invalidate(&self, key: &K) {
        self.lock().pop(key);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (entries in use, capacity)
    pub fn stats(&self) -> (usize, usize) {
        (self.len(), self.capacity)
    }

    /// Memoised call: see the module docs for the freshness and fallback rules.
    pub async fn cached_call<F, Fut, E>(&self, key: K, ttl: Duration, default: V, producer: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        E: Display,
    {
        self.cached_call_with_status(key, ttl, default, producer)
            .await
            .0
    }

    /// Like [`cached_call`](Self::cached_call), also reporting where the value came from.
    pub async fn cached_call_with_status<F, Fut, E>(
        &self,
        key: K,
        ttl: Duration,
        default: V,
        producer: F,
    ) -> (V, CacheStatus)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
        E: Display,
    {
        if let Some(value) = self.get_fresh(&key, ttl) {
            debug!(?key, "cache hit");
            return (value, CacheStatus::Hit);
        }

        let had_entry = self.get_stale(&key).is_some();
        match producer().await {
            Ok(value) => {
                self.put(key, value.clone());
                let status = if had_entry {
                    CacheStatus::Refreshed
                } else {
                    CacheStatus::Miss
                };
                (value, status)
            }
            Err(e) => match self.get_stale(&key) {
                Some(stale) => {
                    warn!(?key, error = %e, "refresh failed, serving stale value");
                    (stale, CacheStatus::Stale)
                }
                None => {
                    warn!(?key, error = %e, "fetch failed, serving default");
                    (default, CacheStatus::Fallback)
                }
            },
        }
    }
}
