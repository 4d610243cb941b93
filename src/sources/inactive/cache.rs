//! Bounded, time-limited cache of report results keyed by filter signature.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use tokio::time::Instant;
use tracing::debug;

use super::model::ResultSet;

/// Cached result with its fetch time.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Shared result set, also handed to the display.
    pub result_set: Arc<ResultSet>,
    /// When the result arrived.
    pub fetched_at: Instant,
}

/// Insertion-ordered cache with TTL.
///
/// Lookups use `peek`, so reads never refresh recency and eviction always
/// drops the entry written longest ago.
#[derive(Debug)]
pub struct ReportCache {
    /// Entries by signature, most recently written first.
    entries: LruCache<String, CacheEntry>,
    /// Maximum age of a servable entry.
    ttl: Duration,
}

impl ReportCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            ttl,
        }
    }

    /// What: Return a live entry for `signature`.
    ///
    /// Details:
    /// - An entry whose age is `>= ttl` is removed and reported as a miss.
    pub fn get(&mut self, signature: &str, now: Instant) -> Option<Arc<ResultSet>> {
        let entry = self.entries.peek(signature)?;
        if now.saturating_duration_since(entry.fetched_at) < self.ttl {
            return Some(Arc::clone(&entry.result_set));
        }
        self.entries.pop(signature);
        debug!(signature, "report cache entry expired");
        None
    }

    /// Store a result, evicting the oldest entry when full.
    pub fn insert(&mut self, signature: String, result_set: Arc<ResultSet>, now: Instant) {
        let entry = CacheEntry {
            result_set,
            fetched_at: now,
        };
        if let Some((evicted, _)) = self.entries.push(signature.clone(), entry)
            && evicted != signature
        {
            debug!(evicted, "report cache full; evicted oldest entry");
        }
    }

    /// Number of stored entries (expired ones included until touched).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rs(n: usize) -> Arc<ResultSet> {
        Arc::new(ResultSet {
            rows: Vec::new(),
            total_count: n,
            has_more: false,
        })
    }

    #[test]
    /// What: Entries are served until the TTL elapses, then dropped.
    fn ttl_expiry() {
        let mut cache = ReportCache::new(10, Duration::from_secs(300));
        let t0 = Instant::now();
        cache.insert("a".into(), rs(1), t0);
        assert!(cache.get("a", t0 + Duration::from_secs(299)).is_some());
        assert!(cache.get("a", t0 + Duration::from_secs(300)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    /// What: Reads do not protect an entry from eviction; the oldest write goes first.
    fn eviction_follows_insertion_order() {
        let mut cache = ReportCache::new(3, Duration::from_secs(300));
        let t0 = Instant::now();
        for (i, key) in ["a", "b", "c"].into_iter().enumerate() {
            cache.insert(key.into(), rs(i), t0);
        }
        assert!(cache.get("a", t0).is_some());
        cache.insert("d".into(), rs(3), t0);
        assert_eq!(cache.len(), 3);
        assert!(cache.get("a", t0).is_none());
        assert!(cache.get("b", t0).is_some());
        assert!(cache.get("d", t0).is_some());
    }

    #[test]
    fn rewrite_replaces_value() {
        let mut cache = ReportCache::new(2, Duration::from_secs(300));
        let t0 = Instant::now();
        cache.insert("a".into(), rs(1), t0);
        cache.insert("a".into(), rs(2), t0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a", t0).map(|r| r.total_count), Some(2));
    }
}
