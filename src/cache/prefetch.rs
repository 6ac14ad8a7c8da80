//! Prefetch Module
//!
//! Fire-and-forget speculative cache warming. A prefetch registers a ticket
//! for its key, waits out a priority-based delay, runs its loader on a
//! detached task, and stores the result. Failures are logged and dropped;
//! prefetching is always best-effort and never surfaces errors to a caller.

use std::future::Future;

use serde_json::Value;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

use crate::cache::ResponseCache;

// == Priority ==
/// Scheduling priority for a prefetch, expressed as a delay before the
/// loader runs. A best-effort de-prioritization, not a hard guarantee:
/// nothing stops a low-priority loader finishing before a high-priority one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    High,
    Medium,
    #[default]
    Low,
}

impl Priority {
    /// Delay applied before the loader is invoked.
    pub fn delay(self) -> Duration {
        match self {
            Priority::High => Duration::from_millis(10),
            Priority::Medium => Duration::from_millis(100),
            Priority::Low => Duration::from_millis(300),
        }
    }
}

impl ResponseCache {
    // == Prefetch ==
    /// Schedules a speculative load for `key`, returning whether it was
    /// actually scheduled.
    ///
    /// No-op when the key is already cached fresh or another prefetch for it
    /// is outstanding (one ticket per key, first registration wins). The
    /// loader runs on a detached task after the priority delay; its ticket is
    /// released when it settles, success or failure. The delay itself is not
    /// cancellable once scheduled.
    pub async fn prefetch<F, Fut>(&self, key: &str, loader: F, priority: Priority) -> bool
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        if !self.inner.write().await.try_register_prefetch(key) {
            debug!(key, "prefetch skipped: cached or already scheduled");
            return false;
        }

        let cache = self.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            sleep(priority.delay()).await;

            match loader().await {
                Ok(value) => {
                    cache.set(&key, value, None).await;
                    debug!(key = %key, ?priority, "prefetch stored");
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "prefetch failed");
                }
            }

            cache.inner.write().await.finish_prefetch(&key);
        });

        true
    }

    // == Warm ==
    /// Bulk prefetch for a known-popular key set, e.g. the marquee teams a
    /// user is most likely to open first. Returns how many loads were
    /// actually scheduled.
    pub async fn warm<I, F, Fut>(&self, keys: I, priority: Priority, loader_for: F) -> usize
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Fut,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        let mut scheduled = 0;
        for key in keys {
            // Futures are lazy: building the load future here does not run
            // it until the prefetch task polls it after its delay.
            let fut = loader_for(&key);
            if self.prefetch(&key, move || fut, priority).await {
                scheduled += 1;
            }
        }
        scheduled
    }

    /// Number of outstanding prefetch tickets.
    pub async fn pending_prefetches(&self) -> usize {
        self.inner.read().await.pending_prefetches()
    }
}
