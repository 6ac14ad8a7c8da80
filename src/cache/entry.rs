//! Cache Entry Module
//!
//! Defines the structure for individual cached responses with TTL and access metadata.

use std::time::{Duration, Instant};

use serde_json::Value;

// == Cache Entry ==
/// A single cached API response with the metadata the eviction scorer needs.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored (compressed) response document
    pub value: Value,
    /// Insertion time; reset on overwrite
    pub stored_at: Instant,
    /// Expiry window relative to `stored_at`
    pub ttl: Duration,
    /// Number of successful lookups since insertion
    pub access_count: u64,
    /// Time of the most recent successful lookup
    pub last_access: Instant,
    /// Estimated serialized size in bytes, computed at insertion
    pub approx_size_bytes: usize,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry with fresh access statistics.
    ///
    /// The value is stored as given (callers apply compression first) and its
    /// size is estimated from the serialized JSON length.
    pub fn new(value: Value, ttl: Duration) -> Self {
        let now = Instant::now();
        let approx_size_bytes = estimate_size(&value);

        Self {
            value,
            stored_at: now,
            ttl,
            access_count: 0,
            last_access: now,
            approx_size_bytes,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived its TTL.
    ///
    /// Boundary condition: an entry expires once strictly more than `ttl` has
    /// elapsed since insertion. An entry aged exactly `ttl` is still valid.
    pub fn is_expired(&self) -> bool {
        self.stored_at.elapsed() > self.ttl
    }

    // == Touch ==
    /// Records a successful lookup. Only `get` mutates access statistics.
    pub fn touch(&mut self) {
        self.access_count += 1;
        self.last_access = Instant::now();
    }

    // == Eviction Score ==
    /// Desirability score used by the eviction policy. The entry with the
    /// LOWEST score is evicted first.
    ///
    /// `access_count - 0.1 * minutes_since_last_access - 0.01 * size_kb`:
    /// frequency rewards keeping, staleness and footprint push towards
    /// eviction. The coefficients are tunable heuristics, not a contract.
    pub fn score(&self, now: Instant) -> f64 {
        let minutes_idle = now.duration_since(self.last_access).as_secs_f64() / 60.0;
        let size_kb = self.approx_size_bytes as f64 / 1024.0;
        self.access_count as f64 - (minutes_idle * 0.1) - (size_kb * 0.01)
    }

    // == Remaining TTL ==
    /// Returns remaining time before expiry, zero if already expired.
    ///
    /// Useful for debugging and statistics purposes.
    pub fn ttl_remaining(&self) -> Duration {
        self.ttl.saturating_sub(self.stored_at.elapsed())
    }
}

// == Utility Functions ==
/// Rough estimate of a value's serialized size in bytes.
pub fn estimate_size(value: &Value) -> usize {
    serde_json::to_string(value).map(|s| s.len()).unwrap_or(0)
}
