//! Cache Store Module
//!
//! Main cache engine: a HashMap of timestamped entries with read-time expiry
//! and oldest-first batch eviction.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, DEFAULT_MAX_SIZE, EVICTION_DIVISOR};

// == Cache Store ==
/// Key/value store with per-read TTL and a hard entry limit.
///
/// The store is not synchronized; callers share it behind a single lock
/// (see `AppState`) so that every check-expire-remove and every
/// evict-then-insert sequence runs as one unit.
///
/// Expired entries are only removed when read or when they fall into an
/// eviction batch. There is no background sweep.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `max_size` entries.
    ///
    /// A `max_size` of zero is treated as one.
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            max_size: max_size.max(1),
        }
    }

    // == Get ==
    /// Returns the value under `key` if it was written less than `ttl` ago.
    ///
    /// A stale entry is removed as a side effect. Missing and stale keys
    /// both yield `None`.
    pub fn get(&mut self, key: &str, ttl: Duration) -> Option<V> {
        self.get_at(key, ttl, Instant::now())
    }

    pub(crate) fn get_at(&mut self, key: &str, ttl: Duration, now: Instant) -> Option<V> {
        let fresh = match self.entries.get(key) {
            Some(entry) => entry.is_fresh(ttl, now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if !fresh {
            if self.entries.remove(key).is_some() {
                self.stats.record_expiration();
            }
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores `value` under `key`, stamped with the current instant.
    ///
    /// Any previous entry under the key is replaced, timestamp included.
    /// When the store is full, the oldest entries are evicted first.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        self.set_at(key.into(), value, Instant::now());
    }

    pub(crate) fn set_at(&mut self, key: String, value: V, now: Instant) {
        self.evict_if_full();
        self.entries.insert(key, CacheEntry::new(value, now));
    }

    // == Remove ==
    /// Removes an entry. Removing a missing key is a no-op.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    // == Evict If Full ==
    /// Drops the oldest tenth of the entries (at least one) when at capacity.
    ///
    /// Age is the write instant only; reads do not refresh it. Entries
    /// written at the same instant are ordered by key.
    fn evict_if_full(&mut self) {
        if self.entries.len() < self.max_size {
            return;
        }

        let mut by_age: Vec<(&String, Instant)> = self
            .entries
            .iter()
            .map(|(key, entry)| (key, entry.created_at))
            .collect();
        by_age.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        let count = (by_age.len() / EVICTION_DIVISOR).max(1);
        let victims: Vec<String> = by_age
            .into_iter()
            .take(count)
            .map(|(key, _)| key.clone())
            .collect();

        for key in victims {
            if self.entries.remove(&key).is_some() {
                self.stats.record_eviction();
            }
        }

        debug!(evicted = count, remaining = self.entries.len(), "cache full, evicted oldest entries");
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Checks for a stored entry without applying any TTL.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    // == Length ==
    /// Returns the current number of entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> Default for CacheStore<V> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_store_new() {
        let store: CacheStore<String> = CacheStore::new(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.max_size(), 100);
    }

    #[test]
    fn test_store_default_capacity() {
        let store: CacheStore<String> = CacheStore::default();
        assert_eq!(store.max_size(), 1000);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut store = CacheStore::new(0);
        store.set("a", 1);
        store.set("b", 2);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("b", TTL), Some(2));
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new(100);

        store.set("key1", "value1".to_string());

        assert_eq!(store.get("key1", TTL), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store: CacheStore<String> = CacheStore::new(100);
        assert_eq!(store.get("nonexistent", TTL), None);
    }

    #[test]
    fn test_zero_ttl_is_immediate_expiry() {
        let mut store = CacheStore::new(100);

        store.set("key1", "value1".to_string());

        assert_eq!(store.get("key1", Duration::ZERO), None);
        assert!(!store.contains_key("key1"));
    }

    #[test]
    fn test_store_overwrite() {
        let mut store = CacheStore::new(100);

        store.set("key1", "value1".to_string());
        store.set("key1", "value2".to_string());

        assert_eq!(store.get("key1", TTL), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_overwrite_resets_timestamp() {
        let mut store = CacheStore::new(100);
        let t0 = Instant::now();
        let ttl = Duration::from_secs(10);

        store.set_at("key1".to_string(), 1, t0);
        store.set_at("key1".to_string(), 2, t0 + Duration::from_secs(8));

        assert_eq!(store.get_at("key1", ttl, t0 + Duration::from_secs(15)), Some(2));
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = CacheStore::new(100);
        let t0 = Instant::now();

        store.set_at("key1".to_string(), "value1".to_string(), t0);

        let later = t0 + Duration::from_secs(15);
        assert_eq!(store.get_at("key1", Duration::from_secs(10), later), None);
        assert!(!store.contains_key("key1"));
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_ttl_chosen_by_reader() {
        let mut store = CacheStore::new(100);
        let t0 = Instant::now();

        store.set_at("feed".to_string(), 1, t0);
        let later = t0 + Duration::from_secs(60);

        assert_eq!(store.get_at("feed", Duration::from_secs(300), later), Some(1));
        assert_eq!(store.get_at("feed", Duration::from_secs(30), later), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = CacheStore::new(100);

        store.set("key1", 1);
        assert_eq!(store.remove("key1"), Some(1));
        assert_eq!(store.remove("key1"), None);
    }

    #[test]
    fn test_eviction_keeps_size_bounded() {
        let mut store = CacheStore::new(10);

        for i in 0..11 {
            store.set(format!("key{}", i), i);
        }

        assert!(store.len() <= 10);
        assert_eq!(store.get("key10", TTL), Some(10));
    }

    #[test]
    fn test_eviction_removes_oldest_first() {
        let mut store = CacheStore::new(3);
        let t0 = Instant::now();

        store.set_at("c".to_string(), 3, t0 + Duration::from_secs(2));
        store.set_at("a".to_string(), 1, t0);
        store.set_at("b".to_string(), 2, t0 + Duration::from_secs(1));
        store.set_at("d".to_string(), 4, t0 + Duration::from_secs(3));

        assert_eq!(store.len(), 3);
        assert!(!store.contains_key("a"));
        assert!(store.contains_key("b"));
        assert!(store.contains_key("c"));
        assert!(store.contains_key("d"));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_eviction_ignores_reads() {
        let mut store = CacheStore::new(2);
        let t0 = Instant::now();

        store.set_at("old".to_string(), 1, t0);
        store.set_at("new".to_string(), 2, t0 + Duration::from_secs(1));

        // Reading "old" does not protect it, unlike LRU
        assert_eq!(store.get_at("old", TTL, t0 + Duration::from_secs(2)), Some(1));
        store.set_at("newest".to_string(), 3, t0 + Duration::from_secs(3));

        assert!(!store.contains_key("old"));
        assert!(store.contains_key("new"));
    }

    #[test]
    fn test_eviction_batch_is_tenth() {
        let mut store = CacheStore::new(100);
        let t0 = Instant::now();

        for i in 0..100u64 {
            store.set_at(format!("key{:03}", i), i, t0 + Duration::from_millis(i));
        }
        store.set_at("extra".to_string(), 100, t0 + Duration::from_secs(1));

        // 10 oldest removed, then one inserted
        assert_eq!(store.len(), 91);
        for i in 0..10 {
            assert!(!store.contains_key(&format!("key{:03}", i)));
        }
        assert!(store.contains_key("key010"));
        assert!(store.contains_key("extra"));
    }

    #[test]
    fn test_eviction_ties_ordered_by_key() {
        let mut store = CacheStore::new(3);
        let t0 = Instant::now();

        store.set_at("z".to_string(), 1, t0);
        store.set_at("m".to_string(), 2, t0);
        store.set_at("a".to_string(), 3, t0);
        store.set_at("new".to_string(), 4, t0 + Duration::from_secs(1));

        assert!(!store.contains_key("a"));
        assert!(store.contains_key("m"));
        assert!(store.contains_key("z"));
    }

    #[test]
    fn test_overwrite_when_full_still_evicts() {
        let mut store = CacheStore::new(3);
        let t0 = Instant::now();

        store.set_at("a".to_string(), 1, t0);
        store.set_at("b".to_string(), 2, t0 + Duration::from_secs(1));
        store.set_at("c".to_string(), 3, t0 + Duration::from_secs(2));
        store.set_at("c".to_string(), 30, t0 + Duration::from_secs(3));

        assert_eq!(store.len(), 2);
        assert!(!store.contains_key("a"));
        assert_eq!(store.get_at("c", TTL, t0 + Duration::from_secs(4)), Some(30));
    }

    #[test]
    fn test_content_classes_independent() {
        let mut store = CacheStore::new(100);

        store.set("post:x", "post body".to_string());
        store.set("page:x", "page body".to_string());

        assert_eq!(store.get("post:x", TTL), Some("post body".to_string()));
        assert_eq!(store.get("page:x", TTL), Some("page body".to_string()));

        store.remove("post:x");
        assert_eq!(store.get("post:x", TTL), None);
        assert_eq!(store.get("page:x", TTL), Some("page body".to_string()));
    }

    #[test]
    fn test_store_stats() {
        let mut store = CacheStore::new(100);

        store.set("key1", 1);
        store.get("key1", TTL); // hit
        store.get("nonexistent", TTL); // miss
        store.get("key1", Duration::ZERO); // expired miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.total_entries, 0);
    }
}
