//! Configuration Module
//!
//! Cache sizing and TTL configuration, with presets tuned per data family
//! and environment-variable overrides for the generic case.

use std::env;
use std::time::Duration;

/// Cache configuration parameters.
///
/// Each view constructs its own cache from an explicit config rather than
/// sharing a module-level singleton, which keeps lifetime and per-view
/// tuning (distinct TTLs and capacities) visible at the construction site.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL applied to entries stored without an explicit override
    pub default_ttl: Duration,
}

impl CacheConfig {
    /// Creates a config with explicit values.
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            max_entries,
            default_ttl,
        }
    }

    // == Presets ==
    /// Team detail responses: small working set, moderate volatility.
    pub fn teams() -> Self {
        Self::new(50, Duration::from_secs(25 * 60))
    }

    /// Roster responses: larger payloads, 20-minute staleness tolerance.
    pub fn rosters() -> Self {
        Self::new(30, Duration::from_secs(20 * 60))
    }

    /// Individual player responses: many small entries, most volatile.
    pub fn players() -> Self {
        Self::new(200, Duration::from_secs(15 * 60))
    }

    // == Environment ==
    /// Creates a config from environment variables with documented defaults.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 100)
    /// - `CACHE_DEFAULT_TTL_SECS` - Default TTL in seconds (default: 1800)
    pub fn from_env() -> Self {
        let max_entries = env::var("CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);
        let ttl_secs: u64 = env::var("CACHE_DEFAULT_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30 * 60);

        Self::new(max_entries, Duration::from_secs(ttl_secs))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(30 * 60))
    }
}
