// TTL response cache - keyed, type-erased, strictly expiring
// Author: kelexine (https://github.com/kelexine)

use crate::cache::models::{CacheStats, Clock, SystemClock};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use std::time::Duration;
use tracing::debug;

/// A cached value and the instant (Unix millis) after which it must not be served.
struct CachedEntry {
    value: Arc<dyn Any + Send + Sync>,
    expires_at: i64,
}

/// In-memory key → (value, expiry) map for slowly changing read results.
///
/// Values of any `'static` type may be stored; a `get` with a different type
/// than was stored behaves as a miss. An entry is returned only while
/// `now < expires_at`; stale entries are dropped on the read that observes them.
///
/// The store is shared state for the lifetime of the application. Construct one
/// and hand it to whatever needs it; tests build isolated instances.
pub struct TtlCache {
    entries: Mutex<HashMap<String, CachedEntry>>,
    /// Per-key fetch gates so concurrent misses on one key fetch only once.
    inflight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    /// Bumped under the `entries` lock by every clear/invalidate. A fetch that
    /// started under an older epoch must not store its result.
    epoch: AtomicU64,
    stats: Mutex<CacheStats>,
    clock: Arc<dyn Clock>,
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TtlCache {
    /// Create a cache driven by the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a cache driven by an explicit clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
            epoch: AtomicU64::new(0),
            stats: Mutex::new(CacheStats::default()),
            clock,
        }
    }

    /// Return the value stored under `key` if it is still live.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.lookup(key, true)
    }

    /// Store `value` under `key`, unconditionally replacing any previous entry.
    pub fn set<T>(&self, key: impl Into<String>, value: T, ttl: Duration)
    where
        T: Send + Sync + 'static,
    {
        self.insert(key.into(), value, ttl, None);
    }

    /// Insert an entry. With `fetched_at` set, the insert is skipped if the cache
    /// was cleared or invalidated since that epoch.
    fn insert<T>(&self, key: String, value: T, ttl: Duration, fetched_at: Option<u64>) -> bool
    where
        T: Send + Sync + 'static,
    {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = self.clock.now_millis().saturating_add(ttl_millis);

        let mut entries = self.entries.lock();
        if let Some(epoch) = fetched_at {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                debug!("Cache invalidated during fetch, not storing: {}", key);
                return false;
            }
        }

        debug!("Cache store: {} (ttl {}ms)", key, ttl_millis);
        entries.insert(
            key,
            CachedEntry {
                value: Arc::new(value),
                expires_at,
            },
        );
        drop(entries);

        self.stats.lock().stores += 1;
        crate::metrics::record_cache_operation("store");
        true
    }

    /// Return the live value for `key`, or run `fetch` and cache its result.
    ///
    /// Concurrent callers missing on the same key are serialized: the first one
    /// fetches, the rest observe its stored value. A failed fetch stores nothing
    /// and the next waiter fetches again. A fetch overtaken by `clear` or
    /// `invalidate` returns its value to the caller without storing it.
    pub async fn get_or_try_insert_with<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        // Fast path: live entry.
        if let Some(value) = self.lookup(key, true) {
            return Ok(value);
        }

        let mut gate = GateGuard {
            cache: self,
            key,
            gate: self.gate(key),
            held: None,
        };
        gate.held = Some(gate.gate.clone().lock_owned().await);

        // Re-check after acquiring the gate; another caller may have filled it.
        if let Some(value) = self.lookup(key, false) {
            debug!("Cache filled by concurrent fetch: {}", key);
            return Ok(value);
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        let value = fetch().await?;
        self.insert(key.to_string(), value.clone(), ttl, Some(epoch));
        Ok(value)
    }

    /// Remove `key`. Returns whether a (live or stale) entry was present.
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = {
            let mut entries = self.entries.lock();
            self.epoch.fetch_add(1, Ordering::SeqCst);
            entries.remove(key).is_some()
        };
        if removed {
            debug!("Cache invalidate: {}", key);
            self.stats.lock().invalidations += 1;
            crate::metrics::record_cache_operation("invalidate");
        }
        removed
    }

    /// Remove several keys at once, returning how many were present.
    pub fn invalidate_many(&self, keys: &[&str]) -> usize {
        keys.iter().filter(|key| self.invalidate(key)).count()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let count = entries.len();
        entries.clear();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        debug!("Cache cleared ({} entries)", count);
    }

    /// Physically remove all expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        let removed = before - entries.len();

        if removed > 0 {
            self.stats.lock().expirations += removed as u64;
            debug!("Purged {} expired cache entries", removed);
        }
        removed
    }

    /// Number of stored entries, including stale ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a live entry exists for `key`, without touching statistics.
    pub fn contains_key(&self, key: &str) -> bool {
        let now = self.clock.now_millis();
        self.entries
            .lock()
            .get(key)
            .map(|entry| now < entry.expires_at)
            .unwrap_or(false)
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }

    fn lookup<T>(&self, key: &str, count_miss: bool) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();

        let live = entries
            .get(key)
            .map(|entry| (now < entry.expires_at, entry.value.clone()));

        let found = match live {
            None => None,
            Some((false, _)) => {
                entries.remove(key);
                self.stats.lock().expirations += 1;
                crate::metrics::record_cache_operation("expired");
                debug!("Cache entry expired: {}", key);
                None
            }
            Some((true, value)) => {
                let value = value.downcast_ref::<T>().cloned();
                if value.is_none() {
                    debug!("Cache type mismatch for key: {}", key);
                }
                value
            }
        };
        drop(entries);

        match &found {
            Some(_) => {
                self.stats.lock().hits += 1;
                crate::metrics::record_cache_operation("hit");
                debug!("Cache hit: {}", key);
            }
            None if count_miss => {
                self.stats.lock().misses += 1;
                crate::metrics::record_cache_operation("miss");
                debug!("Cache miss: {}", key);
            }
            None => {}
        }
        found
    }

    fn gate(&self, key: &str) -> Arc<AsyncMutex<()>> {
        self.inflight
            .lock()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn release_gate(&self, key: &str, gate: &Arc<AsyncMutex<()>>) {
        let mut inflight = self.inflight.lock();
        // One reference in the map, one held by us: nobody else is waiting.
        if Arc::strong_count(gate) <= 2 {
            inflight.remove(key);
        }
    }
}

/// Holds a per-key fetch gate and gives it back on drop, including when the
/// fetching future is cancelled.
struct GateGuard<'a> {
    cache: &'a TtlCache,
    key: &'a str,
    gate: Arc<AsyncMutex<()>>,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        // Unlock first so our own guard does not count as a waiter.
        self.held.take();
        self.cache.release_gate(self.key, &self.gate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::models::ManualClock;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::oneshot;

    fn cache_at(start: i64) -> (TtlCache, ManualClock) {
        let clock = ManualClock::new(start);
        (TtlCache::with_clock(Arc::new(clock.clone())), clock)
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let (cache, _clock) = cache_at(1_000);
        cache.set("dashboard-stats", 42u32, Duration::from_millis(500));

        assert_eq!(cache.get::<u32>("dashboard-stats"), Some(42));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_entry_never_served_past_expiry() {
        let (cache, clock) = cache_at(0);
        cache.set("k", "v".to_string(), Duration::from_millis(100));

        clock.advance(99);
        assert_eq!(cache.get::<String>("k").as_deref(), Some("v"));

        // now == expires_at is already stale
        clock.advance(1);
        assert_eq!(cache.get::<String>("k"), None);
        assert_eq!(cache.len(), 0, "stale entry is dropped on read");

        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn test_overwrite_replaces_value_and_expiry() {
        let (cache, clock) = cache_at(0);
        cache.set("k", 1i32, Duration::from_millis(100));
        clock.advance(80);
        cache.set("k", 2i32, Duration::from_millis(100));
        clock.advance(80);

        assert_eq!(cache.get::<i32>("k"), Some(2));
    }

    #[test]
    fn test_type_mismatch_is_a_miss() {
        let (cache, _clock) = cache_at(0);
        cache.set("k", 7u64, Duration::from_secs(1));

        assert_eq!(cache.get::<String>("k"), None);
        assert_eq!(cache.get::<u64>("k"), Some(7));
    }

    #[test]
    fn test_invalidate_and_purge() {
        let (cache, clock) = cache_at(0);
        cache.set("a", 1u8, Duration::from_millis(10));
        cache.set("b", 2u8, Duration::from_millis(1_000));
        cache.set("c", 3u8, Duration::from_millis(1_000));

        assert!(cache.invalidate("c"));
        assert!(!cache.invalidate("c"));

        clock.advance(50);
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.contains_key("b"));
        assert!(!cache.contains_key("a"));
        assert_eq!(cache.invalidate_many(&["a", "b"]), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_misses_fetch_once() {
        let cache = Arc::new(TtlCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_try_insert_with("budget-status", Duration::from_secs(60), || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, String>(vec![1, 2, 3])
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), vec![1, 2, 3]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.inflight.lock().is_empty());
    }

    #[test]
    fn test_failed_fetch_stores_nothing() {
        let (cache, _clock) = cache_at(0);

        let result: Result<u32, &str> = tokio_test::block_on(
            cache.get_or_try_insert_with("k", Duration::from_secs(1), || async { Err("boom") }),
        );
        assert_eq!(result, Err("boom"));
        assert!(cache.is_empty());

        let result: Result<u32, &str> = tokio_test::block_on(
            cache.get_or_try_insert_with("k", Duration::from_secs(1), || async { Ok(5) }),
        );
        assert_eq!(result, Ok(5));
        assert_eq!(cache.get::<u32>("k"), Some(5));
    }

    #[tokio::test]
    async fn test_clear_during_fetch_discards_result() {
        let (cache, _clock) = cache_at(0);
        let (release, released) = oneshot::channel::<()>();

        let fetch = cache.get_or_try_insert_with("dashboard-stats", Duration::from_secs(60), || async move {
            released.await.ok();
            Ok::<_, ()>(999u32)
        });
        let clear = async {
            tokio::task::yield_now().await;
            cache.clear();
            release.send(()).ok();
        };
        let (result, ()) = tokio::join!(fetch, clear);

        // The caller still gets its answer, but it is not cached for the next session.
        assert_eq!(result, Ok(999));
        assert!(cache.is_empty());
        assert_eq!(cache.get::<u32>("dashboard-stats"), None);
    }

    #[tokio::test]
    async fn test_invalidate_during_fetch_discards_result() {
        let (cache, _clock) = cache_at(0);
        let (release, released) = oneshot::channel::<()>();

        let fetch = cache.get_or_try_insert_with("budget-status", Duration::from_secs(60), || async move {
            released.await.ok();
            Ok::<_, ()>(vec![1u8])
        });
        let invalidate = async {
            tokio::task::yield_now().await;
            cache.invalidate_many(&["budget-status"]);
            release.send(()).ok();
        };
        let (result, ()) = tokio::join!(fetch, invalidate);

        assert_eq!(result, Ok(vec![1u8]));
        assert!(!cache.contains_key("budget-status"));

        // Later fetches store normally again.
        let again: Result<Vec<u8>, ()> = cache
            .get_or_try_insert_with("budget-status", Duration::from_secs(60), || async { Ok(vec![2]) })
            .await;
        assert_eq!(again, Ok(vec![2]));
        assert_eq!(cache.get::<Vec<u8>>("budget-status"), Some(vec![2]));
    }

    #[tokio::test]
    async fn test_cancelled_fetch_releases_gate() {
        let cache = TtlCache::new();

        let cancelled = tokio::time::timeout(
            Duration::from_millis(20),
            cache.get_or_try_insert_with("recent-transactions", Duration::from_secs(60), || {
                std::future::pending::<Result<u32, ()>>()
            }),
        )
        .await;

        assert!(cancelled.is_err());
        assert!(cache.inflight.lock().is_empty());
        assert!(cache.is_empty());
    }
}
