//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, sets, and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Cumulative performance counters, tracked since construction.
///
/// Counters only ever grow; `clear()` on the cache does not reset them, so a
/// long-lived view keeps an honest hit-rate history across cache flushes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of insertions and overwrites
    pub sets: u64,
    /// Number of entries evicted by the scoring policy
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Set ==
    /// Increments the set counter.
    pub fn record_set(&mut self) {
        self.sets += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

// == Stats Snapshot ==
/// Point-in-time observability view combining the cumulative counters with
/// the cache's current occupancy and footprint.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// Current number of entries
    pub size: usize,
    /// Configured capacity
    pub max_size: usize,
    /// hits / (hits + misses), 0.0 before any request
    pub hit_rate: f64,
    /// Estimated total footprint of stored values in KB
    pub total_size_kb: f64,
    /// hits + misses
    pub total_requests: u64,
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub evictions: u64,
}

impl StatsSnapshot {
    /// Builds a snapshot from the counters plus current occupancy numbers.
    pub fn new(stats: &CacheStats, size: usize, max_size: usize, total_size_bytes: usize) -> Self {
        Self {
            size,
            max_size,
            hit_rate: stats.hit_rate(),
            total_size_kb: total_size_bytes as f64 / 1024.0,
            total_requests: stats.hits + stats.misses,
            hits: stats.hits,
            misses: stats.misses,
            sets: stats.sets,
            evictions: stats.evictions,
        }
    }
}
