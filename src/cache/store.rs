//! Response cache storage.
//!
//! Entries carry an absolute expiry. An expired entry reads exactly like a
//! missing one and is dropped lazily on the lookup that finds it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use dashmap::DashMap;
use metrics::counter;

pub(crate) const METRIC_CACHE_HIT: &str = "portfolio_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "portfolio_cache_miss_total";
pub(crate) const METRIC_CACHE_STORE: &str = "portfolio_cache_store_total";
pub(crate) const METRIC_CACHE_EVICT: &str = "portfolio_cache_evict_total";

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ms: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        let millis = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.offset_ms.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

/// Serialized response body plus the content type it was produced with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPayload {
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl CachedPayload {
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self {
            content_type: Some("application/json".to_string()),
            body: body.into(),
        }
    }
}

struct CacheEntry {
    payload: CachedPayload,
    expires_at: Instant,
}

/// Process-wide response cache keyed by request path and query.
///
/// Cloning is cheap and every clone shares the same entries.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
        }
    }

    pub fn lookup(&self, key: &str) -> Option<CachedPayload> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key) {
            if now < entry.expires_at {
                counter!(METRIC_CACHE_HIT).increment(1);
                return Some(entry.payload.clone());
            }
            drop(entry);
            self.entries
                .remove_if(key, |_, entry| now >= entry.expires_at);
        }
        counter!(METRIC_CACHE_MISS).increment(1);
        None
    }

    /// Unconditional overwrite; the newest write for a key wins.
    pub fn store(&self, key: impl Into<String>, payload: CachedPayload, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        self.entries.insert(
            key.into(),
            CacheEntry {
                payload,
                expires_at,
            },
        );
        counter!(METRIC_CACHE_STORE).increment(1);
    }

    /// Removes one key, or everything when `key` is `None`. Returns how many
    /// entries were dropped.
    pub fn evict(&self, key: Option<&str>) -> usize {
        let removed = match key {
            Some(key) => usize::from(self.entries.remove(key).is_some()),
            None => {
                let count = self.entries.len();
                self.entries.clear();
                count
            }
        };
        counter!(METRIC_CACHE_EVICT).increment(removed as u64);
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with_clock() -> (ResponseCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (ResponseCache::with_clock(clock.clone()), clock)
    }

    #[test]
    fn lookup_hits_before_expiry() {
        let (cache, clock) = cache_with_clock();
        cache.store("/api/projects", CachedPayload::json("[]"), Duration::from_secs(300));

        clock.advance(Duration::from_secs(299));
        let hit = cache.lookup("/api/projects").expect("fresh entry");
        assert_eq!(hit.body, Bytes::from_static(b"[]"));
    }

    #[test]
    fn expired_entry_reads_as_absent() {
        let (cache, clock) = cache_with_clock();
        cache.store("/api/projects", CachedPayload::json("[]"), Duration::from_secs(300));

        clock.advance(Duration::from_secs(300));
        assert!(cache.lookup("/api/projects").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn store_overwrites_and_resets_expiry() {
        let (cache, clock) = cache_with_clock();
        cache.store("/api/skills", CachedPayload::json("[1]"), Duration::from_secs(10));
        clock.advance(Duration::from_secs(8));
        cache.store("/api/skills", CachedPayload::json("[2]"), Duration::from_secs(10));
        clock.advance(Duration::from_secs(8));

        let hit = cache.lookup("/api/skills").expect("rewritten entry");
        assert_eq!(hit.body, Bytes::from_static(b"[2]"));
    }

    #[test]
    fn evict_single_key_leaves_others() {
        let cache = ResponseCache::new();
        let ttl = Duration::from_secs(60);
        cache.store("/api/projects", CachedPayload::json("[]"), ttl);
        cache.store("/api/blogs", CachedPayload::json("[]"), ttl);

        assert_eq!(cache.evict(Some("/api/projects")), 1);
        assert_eq!(cache.evict(Some("/api/projects")), 0);
        assert!(cache.lookup("/api/projects").is_none());
        assert!(cache.lookup("/api/blogs").is_some());
    }

    #[test]
    fn evict_all_clears_everything() {
        let cache = ResponseCache::new();
        let ttl = Duration::from_secs(60);
        cache.store("/api/projects", CachedPayload::json("[]"), ttl);
        cache.store("/api/blogs?x=1", CachedPayload::json("[]"), ttl);

        assert_eq!(cache.evict(None), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn clones_share_entries() {
        let cache = ResponseCache::new();
        let other = cache.clone();
        cache.store("/api/services", CachedPayload::json("[]"), Duration::from_secs(60));
        assert!(other.lookup("/api/services").is_some());
    }
}
