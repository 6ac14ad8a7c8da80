//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with scored eviction and lazy
//! TTL expiration. `CacheStore` is the single-owner core; `ResponseCache`
//! wraps it for shared use across view tasks and prefetch tasks.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{compress, CacheEntry, CacheStats, StatsSnapshot};
use crate::config::CacheConfig;

// == Cache Store ==
/// Bounded response store with TTL expiry and value-scored eviction.
///
/// Expiry is lazy: an expired entry is deleted on the `get` that finds it
/// stale, never by a background sweep. Memory for expired-but-unaccessed
/// entries is reclaimed on the next lookup, eviction pass, or `clear`.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Keys with an outstanding prefetch ticket
    tickets: HashSet<String>,
    /// Cumulative performance counters
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL applied to entries stored without an explicit override
    default_ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore with the given capacity and default TTL.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            tickets: HashSet::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a response under `key`, compressing it first.
    ///
    /// Overwriting resets the entry's insertion time and access statistics;
    /// nothing of the previous entry survives. If the cache is at capacity
    /// and the key is new, exactly one entry is evicted first. Never fails:
    /// capacity is self-enforced by eviction, not by rejection.
    pub fn set(&mut self, key: &str, value: Value, ttl_override: Option<Duration>) {
        let is_overwrite = self.entries.contains_key(key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            self.evict_one();
        }

        let ttl = ttl_override.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(compress::compress(value), ttl);
        self.entries.insert(key.to_string(), entry);
        self.stats.record_set();
    }

    // == Get ==
    /// Looks up a response by key.
    ///
    /// Returns an owned value, never a reference into storage. An entry past
    /// its TTL is deleted here and reported as a miss; within the window the
    /// lookup bumps the entry's access statistics.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let Some(entry) = self.entries.get_mut(key) else {
            self.stats.record_miss();
            return None;
        };

        if entry.is_expired() {
            self.entries.remove(key);
            self.stats.record_miss();
            debug!(key, "dropped expired entry on lookup");
            return None;
        }

        entry.touch();
        let value = entry.value.clone();
        self.stats.record_hit();
        Some(compress::decompress(value))
    }

    // == Contains Fresh ==
    /// True when `key` holds an unexpired entry. Does not touch access
    /// statistics or delete expired entries; used by prefetch deduplication.
    pub fn contains_fresh(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|e| !e.is_expired())
    }

    // == Evict One ==
    /// Removes the entry with the lowest desirability score.
    ///
    /// O(n) scan over all entries; acceptable while capacities stay in the
    /// tens to low hundreds. Ties go to whichever entry the scan saw first.
    fn evict_one(&mut self) {
        let now = Instant::now();
        let victim = self
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.score(now)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(key, _)| key);

        if let Some(key) = victim {
            self.entries.remove(&key);
            self.stats.record_eviction();
            debug!(key = %key, "evicted least valuable entry");
        }
    }

    // == Prefetch Tickets ==
    /// Registers a prefetch ticket for `key`. Returns false (no ticket) when
    /// the key is already cached fresh or a ticket is already outstanding,
    /// making the first registration the only one that wins.
    pub fn try_register_prefetch(&mut self, key: &str) -> bool {
        if self.contains_fresh(key) {
            return false;
        }
        self.tickets.insert(key.to_string())
    }

    /// Releases the prefetch ticket for `key` once its loader settles.
    pub fn finish_prefetch(&mut self, key: &str) {
        self.tickets.remove(key);
    }

    /// Number of outstanding prefetch tickets.
    pub fn pending_prefetches(&self) -> usize {
        self.tickets.len()
    }

    // == Clear ==
    /// Drops every entry and every prefetch ticket. Loaders already running
    /// are not cancelled; a late `set` into the emptied cache is harmless.
    /// Cumulative counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.tickets.clear();
    }

    // == Stats ==
    /// Returns a point-in-time observability snapshot.
    pub fn stats(&self) -> StatsSnapshot {
        let total_size: usize = self.entries.values().map(|e| e.approx_size_bytes).sum();
        StatsSnapshot::new(&self.stats, self.entries.len(), self.max_entries, total_size)
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Response Cache ==
/// Shared handle to a [`CacheStore`], cloneable across view and prefetch
/// tasks. All mutation goes through the single lock, so `set` followed by
/// `get` on the same key always observes the stored value.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    pub(crate) inner: Arc<RwLock<CacheStore>>,
}

impl ResponseCache {
    /// Creates a cache with explicit capacity and default TTL.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheStore::new(max_entries, default_ttl))),
        }
    }

    /// Creates a cache from a [`CacheConfig`] (env or preset).
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.default_ttl)
    }

    /// See [`CacheStore::set`].
    pub async fn set(&self, key: &str, value: Value, ttl_override: Option<Duration>) {
        self.inner.write().await.set(key, value, ttl_override);
    }

    /// See [`CacheStore::get`].
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.inner.write().await.get(key)
    }

    /// See [`CacheStore::contains_fresh`].
    pub async fn contains_fresh(&self, key: &str) -> bool {
        self.inner.read().await.contains_fresh(key)
    }

    /// See [`CacheStore::clear`].
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// See [`CacheStore::stats`].
    pub async fn stats(&self) -> StatsSnapshot {
        self.inner.read().await.stats()
    }

    /// Current entry count.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// True when no entries are stored.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    fn store() -> CacheStore {
        CacheStore::new(100, Duration::from_secs(300))
    }

    #[test]
    fn test_store_new() {
        let store = store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = store();

        store.set("team_1", json!({"id": 1}), None);
        let value = store.get("team_1").unwrap();

        assert_eq!(value, json!({"id": 1}));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent_is_miss() {
        let mut store = store();

        assert!(store.get("nonexistent").is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_overwrite_replaces_value() {
        let mut store = store();

        store.set("k", json!("v1"), None);
        store.set("k", json!("v2"), None);

        assert_eq!(store.get("k").unwrap(), json!("v2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = store();

        store.set("k", json!("v"), Some(Duration::from_millis(100)));
        assert!(store.get("k").is_some());

        sleep(Duration::from_millis(150));

        assert!(store.get("k").is_none());
        assert_eq!(store.len(), 0, "expired entry is deleted on lookup");
    }

    #[test]
    fn test_expired_entry_counts_as_miss() {
        let mut store = store();

        store.set("k", json!("v"), Some(Duration::from_millis(30)));
        sleep(Duration::from_millis(60));
        let _ = store.get("k");

        let stats = store.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_capacity_enforced_by_eviction() {
        let mut store = CacheStore::new(3, Duration::from_secs(300));

        for i in 0..10 {
            store.set(&format!("k{i}"), json!(i), None);
        }

        assert_eq!(store.len(), 3);
        assert_eq!(store.stats().evictions, 7);
    }

    #[test]
    fn test_eviction_prefers_unaccessed_entry() {
        let mut store = CacheStore::new(2, Duration::from_secs(300));

        store.set("a", json!("va"), None);
        for _ in 0..5 {
            store.get("a").unwrap();
        }
        store.set("b", json!("vb"), None);

        // "b" has zero accesses, so it scores lowest and goes first.
        store.set("c", json!("vc"), None);

        assert!(store.contains_fresh("a"));
        assert!(!store.contains_fresh("b"));
        assert!(store.contains_fresh("c"));
    }

    #[test]
    fn test_overwrite_resets_access_stats() {
        let mut store = CacheStore::new(2, Duration::from_secs(300));

        store.set("hot", json!("v1"), None);
        for _ in 0..3 {
            store.get("hot").unwrap();
        }
        store.set("other", json!("v"), None);
        store.get("other").unwrap();

        // Overwriting "hot" wipes its access count back to zero, so it now
        // scores below "other" (one access) and is the eviction victim.
        store.set("hot", json!("v2"), None);
        store.set("new", json!("v"), None);

        assert!(!store.contains_fresh("hot"));
        assert!(store.contains_fresh("other"));
    }

    #[test]
    fn test_get_does_not_evict() {
        let mut store = CacheStore::new(2, Duration::from_secs(300));

        store.set("a", json!("va"), None);
        store.set("b", json!("vb"), None);

        let first = store.get("a").unwrap();
        let second = store.get("a").unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_contains_fresh_ignores_expired() {
        let mut store = store();

        store.set("k", json!("v"), Some(Duration::from_millis(30)));
        assert!(store.contains_fresh("k"));

        sleep(Duration::from_millis(60));

        assert!(!store.contains_fresh("k"));
        // contains_fresh never mutates counters.
        assert_eq!(store.stats().misses, 0);
    }

    #[test]
    fn test_clear_empties_entries_and_tickets() {
        let mut store = store();

        store.set("a", json!("v"), None);
        store.set("b", json!("v"), None);
        assert!(store.try_register_prefetch("c"));

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.pending_prefetches(), 0);
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_clear_keeps_cumulative_counters() {
        let mut store = store();

        store.set("a", json!("v"), None);
        store.get("a").unwrap();
        store.clear();

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.sets, 1);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn test_prefetch_ticket_dedup() {
        let mut store = store();

        assert!(store.try_register_prefetch("k"));
        assert!(!store.try_register_prefetch("k"), "second ticket rejected");

        store.finish_prefetch("k");
        assert!(store.try_register_prefetch("k"));
    }

    #[test]
    fn test_prefetch_ticket_rejected_for_fresh_key() {
        let mut store = store();

        store.set("k", json!("v"), None);
        assert!(!store.try_register_prefetch("k"));
    }

    #[test]
    fn test_prefetch_ticket_allowed_for_expired_key() {
        let mut store = store();

        store.set("k", json!("v"), Some(Duration::from_millis(20)));
        sleep(Duration::from_millis(50));

        assert!(store.try_register_prefetch("k"));
    }

    #[test]
    fn test_set_compresses_roster_payload() {
        let mut store = store();

        store.set(
            "roster_x",
            json!({"roster": [{"player_id": 1, "name": "A", "salary": "drop-me"}]}),
            None,
        );

        let value = store.get("roster_x").unwrap();
        assert_eq!(value["roster"][0]["name"], "A");
        assert!(value["roster"][0].get("salary").is_none());
    }

    #[test]
    fn test_stats_snapshot_totals() {
        let mut store = store();

        store.set("a", json!({"payload": "x".repeat(2048)}), None);
        store.get("a").unwrap();
        let _ = store.get("missing");

        let stats = store.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.total_requests, 2);
        assert!((stats.hit_rate - 0.5).abs() < 0.001);
        assert!(stats.total_size_kb > 1.0);
    }

    #[tokio::test]
    async fn test_shared_handle_set_then_get() {
        let cache = ResponseCache::new(10, Duration::from_secs(60));

        cache.set("k", json!({"id": 7}), None).await;

        let clone = cache.clone();
        assert_eq!(clone.get("k").await.unwrap(), json!({"id": 7}));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_shared_handle_clear() {
        let cache = ResponseCache::new(10, Duration::from_secs(60));

        cache.set("k", json!("v"), None).await;
        cache.clear().await;

        assert!(cache.is_empty().await);
        assert!(cache.get("k").await.is_none());
    }
}
