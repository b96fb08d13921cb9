//! Fixed-Window Rate Limiter
//!
//! Decides per request whether a client may proceed, counting requests in
//! fixed windows keyed by client identity. Built entirely on the store's
//! atomic counter primitive.
//!
//! Known limitation, kept deliberately: fixed-window counting admits up to
//! 2x the limit across a window boundary in the worst case (a full window
//! at the end of one window plus a full window at the start of the next).
//! Switching to a sliding window would change observable behavior.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::{ms_to_secs_ceil, now_ms, Store};

/// Key namespace for limiter state; application cache keys never use it.
const RATE_LIMIT_PREFIX: &str = "ratelimit:";

// == Rate-Limit Record ==
/// Bookkeeping for one client's current window. Created on the first
/// request of a window, updated on every request in it, replaced when a
/// request arrives after the window has elapsed. Stale records self-evict
/// via their TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitRecord {
    /// Client identity this record belongs to
    pub client: String,
    /// Requests observed so far in the current window
    pub count: i64,
    /// Instant (Unix milliseconds) at which the window ends
    pub window_reset_at: u64,
}

// == Decision ==
/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request may proceed
    pub admitted: bool,
    /// How long a rejected caller should wait, in whole seconds
    pub retry_after_secs: u64,
}

impl Decision {
    fn admit() -> Self {
        Self {
            admitted: true,
            retry_after_secs: 0,
        }
    }

    fn reject(retry_after_secs: u64) -> Self {
        Self {
            admitted: false,
            retry_after_secs,
        }
    }
}

// == Rate Limiter ==
/// Fixed-window admission controller. Configuration is fixed at
/// construction and validated there; a bad limit or window fails startup
/// instead of degrading silently at runtime.
#[derive(Clone)]
pub struct RateLimiter {
    store: Store,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    /// Creates a limiter allowing `limit` requests per `window`.
    pub fn new(store: Store, limit: u32, window: Duration) -> Result<Self, StoreError> {
        if limit == 0 {
            return Err(StoreError::InvalidConfig(
                "rate limit must be at least 1".to_string(),
            ));
        }
        if window.is_zero() {
            return Err(StoreError::InvalidConfig(
                "rate limit window must be positive".to_string(),
            ));
        }
        Ok(Self {
            store,
            limit,
            window,
        })
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Checks whether the client identified by `client` may proceed.
    ///
    /// The count lives in a counter keyed on the window's identity
    /// (`ratelimit:<client>:<reset_ms>`), so concurrent requests in the
    /// same window serialize through the store's atomic increment and
    /// none are undercounted. The record at `ratelimit:<client>` carries
    /// the window bookkeeping; both expire with the window.
    ///
    /// If the store cannot serve the check, the request is admitted:
    /// availability of the protected service outranks strict enforcement
    /// while the limiter's own dependency is down.
    pub async fn check(&self, client: &str) -> Decision {
        let record_key = format!("{RATE_LIMIT_PREFIX}{client}");
        let now = now_ms();

        // A record whose window has elapsed (strictly: now past the reset
        // instant) starts a fresh window; arrival exactly at the reset
        // instant still counts against the current one. Fresh windows are
        // aligned to epoch multiples of the window length so concurrent
        // first requests derive the same window identity.
        let window_ms = self.window.as_millis() as u64;
        let fresh_reset = (now / window_ms + 1) * window_ms;
        let record: Option<RateLimitRecord> = self.store.get(&record_key).await;
        let window_reset_at = match record {
            Some(ref r) if now <= r.window_reset_at => r.window_reset_at,
            _ => fresh_reset,
        };

        let counter_key = format!("{record_key}:{window_reset_at}");
        let count = match self.store.increment(&counter_key, 1).await {
            Ok(count) => count,
            Err(e) => {
                warn!(client, error = %e, "limiter store unavailable, admitting");
                return Decision::admit();
            }
        };

        // Align both keys' expiry to the window end so stale state
        // self-evicts. Reapplied on every request: expire is best-effort,
        // and a counter whose first expire call was dropped would
        // otherwise never carry a TTL and never be reclaimed.
        let ttl_secs = ms_to_secs_ceil(window_reset_at.saturating_sub(now)).max(1);
        self.store.expire(&counter_key, ttl_secs).await;
        let updated = RateLimitRecord {
            client: client.to_string(),
            count,
            window_reset_at,
        };
        self.store.set(&record_key, &updated, Some(ttl_secs)).await;

        if count > i64::from(self.limit) {
            let retry_after_secs = ms_to_secs_ceil(window_reset_at.saturating_sub(now));
            debug!(client, count, retry_after_secs, "request rejected");
            Decision::reject(retry_after_secs)
        } else {
            debug!(client, count, "request admitted");
            Decision::admit()
        }
    }
}
