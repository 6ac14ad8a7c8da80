//! Error types for the data-access layer
//!
//! Provides unified error handling using thiserror.
//!
//! The cache itself has no failure modes: a miss is `None`, eviction and
//! prefetch failures stay internal. Errors here belong to the fetch path
//! that sits between a view and the backend.

use thiserror::Error;

// == Fetch Error Enum ==
/// Unified error type for cache-backed fetches.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request's cancellation token fired before the loader finished
    #[error("Fetch cancelled: {0}")]
    Cancelled(String),

    /// The backend responded, but the payload fails structural validation
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The loader itself failed (network, decode, backend error)
    #[error("Upstream fetch failed: {0}")]
    Upstream(#[from] anyhow::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the fetch layer.
pub type Result<T> = std::result::Result<T, FetchError>;
