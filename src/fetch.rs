//! Fetch Module
//!
//! Cache-backed data access for view code: check the cache, fall back to a
//! loader racing a per-request cancellation token, validate what came back,
//! then store it. The cache never sees a cancellation; an aborted request
//! simply never reaches `set`.
//!
//! Each request owns its own [`CancellationToken`], handed down by the
//! caller. Tokens are never shared or swapped between requests, so a
//! navigation cancelling request N cannot race the start of request N+1.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::error::{FetchError, Result};

// == TTL Heuristics ==
/// TTL for team detail responses that include season stats.
const FULL_DETAIL_TTL: Duration = Duration::from_secs(20 * 60);

/// Shorter TTL for detail responses still missing season stats, so an
/// incomplete payload gets refreshed sooner.
const PARTIAL_DETAIL_TTL: Duration = Duration::from_secs(10 * 60);

// == Fetch Outcome ==
/// A fetched (or cache-served) value plus the identities of any roster items
/// dropped by validation. An empty `dropped` means the payload was taken
/// whole.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// The response document the view should render
    pub value: Value,
    /// Labels of roster items discarded for missing identity fields
    pub dropped: Vec<String>,
}

impl FetchOutcome {
    fn clean(value: Value) -> Self {
        Self {
            value,
            dropped: Vec::new(),
        }
    }
}

// == Get Or Fetch ==
/// Serves `key` from the cache, or runs `loader` and stores its result.
///
/// The loader races the request's cancellation token; if the token fires
/// first, the result is [`FetchError::Cancelled`] and the cache is left
/// untouched. No shape validation is applied; use [`fetch_team_detail`] for
/// team detail payloads.
pub async fn get_or_fetch<F, Fut>(
    cache: &ResponseCache,
    key: &str,
    ttl_override: Option<Duration>,
    loader: F,
    cancel: &CancellationToken,
) -> Result<FetchOutcome>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<Value>>,
{
    if let Some(hit) = cache.get(key).await {
        debug!(key, "served from cache");
        return Ok(FetchOutcome::clean(hit));
    }

    let value = run_cancellable(key, loader, cancel).await?;
    cache.set(key, value.clone(), ttl_override).await;

    Ok(FetchOutcome::clean(value))
}

// == Fetch Team Detail ==
/// Cache-backed fetch for a team detail payload, with structural validation
/// and partial-failure tolerance.
///
/// A response without `basic_info` is rejected outright and nothing is
/// cached. Roster items missing their identity fields are filtered out; the
/// well-formed remainder is cached and returned together with the dropped
/// items' labels so the view can tell the user what is missing. The TTL is
/// picked by payload completeness (see [`suggest_ttl`]).
pub async fn fetch_team_detail<F, Fut>(
    cache: &ResponseCache,
    key: &str,
    loader: F,
    cancel: &CancellationToken,
) -> Result<FetchOutcome>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<Value>>,
{
    if let Some(hit) = cache.get(key).await {
        debug!(key, "served from cache");
        return Ok(FetchOutcome::clean(hit));
    }

    let mut value = run_cancellable(key, loader, cancel).await?;

    if value.get("basic_info").is_none() {
        return Err(FetchError::MalformedResponse(
            "team detail payload is missing basic_info".to_string(),
        ));
    }

    let dropped = sanitize_roster(&mut value);
    if !dropped.is_empty() {
        warn!(key, dropped = dropped.len(), "discarded malformed roster items");
    }

    let ttl = suggest_ttl(&value);
    cache.set(key, value.clone(), Some(ttl)).await;

    Ok(FetchOutcome { value, dropped })
}

// == Cancellation Race ==
async fn run_cancellable<F, Fut>(key: &str, loader: F, cancel: &CancellationToken) -> Result<Value>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<Value>>,
{
    tokio::select! {
        // Checked first so an already-cancelled request never starts a load.
        biased;
        _ = cancel.cancelled() => {
            debug!(key, "fetch cancelled before completion");
            Err(FetchError::Cancelled(key.to_string()))
        }
        result = loader() => Ok(result?),
    }
}

// == Roster Sanitation ==
/// Removes roster items missing their required identity fields (`player_id`
/// and `name`), returning labels for the dropped items. Payloads without a
/// roster array are left untouched.
pub fn sanitize_roster(value: &mut Value) -> Vec<String> {
    let Some(Value::Array(roster)) = value.get_mut("roster") else {
        return Vec::new();
    };

    let mut dropped = Vec::new();
    let mut index = 0usize;
    roster.retain(|item| {
        let keep = item.get("player_id").is_some_and(|id| !id.is_null())
            && item.get("name").is_some_and(|n| n.is_string());
        if !keep {
            dropped.push(item_label(item, index));
        }
        index += 1;
        keep
    });

    dropped
}

/// Best label available for a malformed roster item.
fn item_label(item: &Value, index: usize) -> String {
    if let Some(name) = item.get("name").and_then(Value::as_str) {
        return name.to_string();
    }
    if let Some(id) = item.get("player_id") {
        if !id.is_null() {
            return format!("player_id {id}");
        }
    }
    format!("roster[{index}]")
}

// == TTL Suggestion ==
/// Volatility-aware TTL for a team detail payload: complete payloads (with
/// `season_stats`) keep for 20 minutes, incomplete ones for 10.
pub fn suggest_ttl(value: &Value) -> Duration {
    if value.get("season_stats").is_some() {
        FULL_DETAIL_TTL
    } else {
        PARTIAL_DETAIL_TTL
    }
}
