//! Cache Module
//!
//! Provides bounded in-memory caching of JSON API responses with TTL
//! expiration, value-scored eviction, lossy field-pruning compression, and
//! background prefetch scheduling.

pub mod compress;
mod entry;
mod prefetch;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use prefetch::Priority;
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{CacheStore, ResponseCache};
