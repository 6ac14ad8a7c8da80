//! Fastbreak Cache - an in-process response cache for stats views
//!
//! Provides bounded TTL caching of JSON API responses with value-scored
//! eviction, lossy payload compression, background prefetch, and a
//! cancellation-aware fetch layer for the views that consume it.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;

pub use cache::{CacheStats, CacheStore, Priority, ResponseCache, StatsSnapshot};
pub use config::CacheConfig;
pub use error::FetchError;
pub use fetch::{fetch_team_detail, get_or_fetch, FetchOutcome};
