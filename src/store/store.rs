//! Store Facade
//!
//! Typed, prefix-namespaced view over a [`StoreBackend`]. Values are
//! serde_json-encoded; integers serialize to ASCII digits, which is what
//! lets the counter primitives agree between JSON decoding and Redis
//! INCRBY.
//!
//! Failure semantics: the store is an optimization, never a source of
//! truth. Reads fail open to absent and writes are best-effort; backend
//! trouble is counted and logged, not propagated. The two exceptions are
//! `increment`/`decrement`, which return `Result` so callers that need the
//! counter for a decision (the admission controller) can see the failure
//! and apply their own fail-open policy.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::backend::StoreBackend;
use crate::store::entry::KeyTtl;
use crate::store::stats::{StatsSnapshot, StoreStats};

// == Store ==
/// Cheaply cloneable handle; clones share the backend and statistics.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn StoreBackend>,
    prefix: String,
    default_ttl: u64,
    op_timeout: Duration,
    stats: Arc<StoreStats>,
}

impl Store {
    /// Creates a store over `backend`. `prefix` is applied to every key of
    /// every operation. `default_ttl` (seconds) is used by writes that do
    /// not specify one; zero means no expiry. `op_timeout` bounds each
    /// backend call; an elapsed timeout counts as the store being
    /// unavailable.
    pub fn new(
        backend: Arc<dyn StoreBackend>,
        prefix: impl Into<String>,
        default_ttl: u64,
        op_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
            default_ttl,
            op_timeout,
            stats: Arc::new(StoreStats::new()),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Unavailable(format!(
                "operation timed out after {:?}",
                self.op_timeout
            ))),
        }
    }

    fn trace_op(&self, op: &str, key: &str, started: Instant, outcome: &str) {
        debug!(
            op,
            key,
            elapsed_ms = started.elapsed().as_millis() as u64,
            outcome
        );
    }

    // == Get ==
    /// Returns the value at `key`, or None if never set, deleted or
    /// expired. Backend and decode failures degrade to None.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let started = Instant::now();
        let full = self.full_key(key);
        match self.bounded(self.backend.get(&full)).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => {
                    self.stats.record_hit();
                    self.trace_op("get", key, started, "hit");
                    Some(value)
                }
                Err(e) => {
                    self.stats.record_error();
                    warn!(op = "get", key, error = %e, "decode failure, treating as miss");
                    None
                }
            },
            Ok(None) => {
                self.stats.record_miss();
                self.trace_op("get", key, started, "miss");
                None
            }
            Err(e) => {
                self.stats.record_error();
                warn!(op = "get", key, error = %e, "store unavailable, treating as miss");
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` at `key`, overwriting unconditionally. `ttl` in
    /// seconds: None uses the configured default, zero means no expiry.
    /// Best-effort: failures are logged and absorbed.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<u64>) {
        let started = Instant::now();
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.stats.record_error();
                warn!(op = "set", key, error = %e, "value failed to serialize, write dropped");
                return;
            }
        };
        let ttl_secs = ttl.unwrap_or(self.default_ttl);
        let full = self.full_key(key);
        match self.bounded(self.backend.set(&full, bytes, ttl_secs)).await {
            Ok(()) => self.trace_op("set", key, started, "ok"),
            Err(e) => {
                self.stats.record_error();
                warn!(op = "set", key, error = %e, "write failed");
            }
        }
    }

    // == Delete ==
    /// Removes `key` if present; absence is not an error.
    pub async fn delete(&self, key: &str) {
        self.delete_many(&[key.to_string()]).await;
    }

    /// Removes all `keys` that are present.
    pub async fn delete_many(&self, keys: &[String]) {
        let started = Instant::now();
        let full: Vec<String> = keys.iter().map(|k| self.full_key(k)).collect();
        match self.bounded(self.backend.delete(&full)).await {
            Ok(()) => self.trace_op("delete", &keys.join(","), started, "ok"),
            Err(e) => {
                self.stats.record_error();
                warn!(op = "delete", error = %e, "delete failed");
            }
        }
    }

    // == Batch Get ==
    /// One slot per input key, in input order. A whole-batch failure
    /// degrades every slot to None.
    pub async fn mget<T: DeserializeOwned>(&self, keys: &[String]) -> Vec<Option<T>> {
        let started = Instant::now();
        let full: Vec<String> = keys.iter().map(|k| self.full_key(k)).collect();
        match self.bounded(self.backend.mget(&full)).await {
            Ok(raw) => {
                let values: Vec<Option<T>> = raw
                    .into_iter()
                    .zip(keys)
                    .map(|(slot, key)| match slot {
                        Some(bytes) => match serde_json::from_slice(&bytes) {
                            Ok(value) => {
                                self.stats.record_hit();
                                Some(value)
                            }
                            Err(e) => {
                                // Per-key miss handling: one bad slot does
                                // not fail the batch.
                                self.stats.record_error();
                                warn!(op = "mget", key, error = %e, "decode failure, slot degraded to miss");
                                None
                            }
                        },
                        None => {
                            self.stats.record_miss();
                            None
                        }
                    })
                    .collect();
                self.trace_op("mget", &keys.join(","), started, "ok");
                values
            }
            Err(e) => {
                self.stats.record_error();
                warn!(op = "mget", error = %e, "store unavailable, all slots degraded to miss");
                keys.iter().map(|_| None).collect()
            }
        }
    }

    // == Batch Set ==
    /// Applies entries one at a time, best-effort-partial: a failing entry
    /// is logged and skipped, the rest are still written, and nothing is
    /// rolled back.
    pub async fn mset<T: Serialize>(&self, entries: &[(String, T)], ttl: Option<u64>) {
        for (key, value) in entries {
            self.set(key, value, ttl).await;
        }
    }

    // == Counters ==
    /// Atomically adds `amount` to the integer at `key`, initializing an
    /// absent key at zero, and returns the post-operation value.
    ///
    /// Unlike reads this propagates errors: callers gating decisions on
    /// the counter must be able to tell a failed increment from an empty
    /// window.
    pub async fn increment(&self, key: &str, amount: i64) -> Result<i64, StoreError> {
        let started = Instant::now();
        let full = self.full_key(key);
        match self.bounded(self.backend.incr(&full, amount)).await {
            Ok(value) => {
                self.trace_op("incr", key, started, "ok");
                Ok(value)
            }
            Err(e) => {
                self.stats.record_error();
                warn!(op = "incr", key, error = %e, "counter operation failed");
                Err(e)
            }
        }
    }

    /// Atomic subtraction; see [`Store::increment`].
    pub async fn decrement(&self, key: &str, amount: i64) -> Result<i64, StoreError> {
        self.increment(key, -amount).await
    }

    // == Exists ==
    /// Whether a live entry exists for `key`. Fails open to false.
    pub async fn exists(&self, key: &str) -> bool {
        let full = self.full_key(key);
        match self.bounded(self.backend.exists(&full)).await {
            Ok(exists) => exists,
            Err(e) => {
                self.stats.record_error();
                warn!(op = "exists", key, error = %e, "store unavailable, treating as absent");
                false
            }
        }
    }

    // == TTL ==
    /// Remaining lifetime of `key`. Fails open to Missing.
    pub async fn ttl_remaining(&self, key: &str) -> KeyTtl {
        let full = self.full_key(key);
        match self.bounded(self.backend.ttl(&full)).await {
            Ok(-2) => KeyTtl::Missing,
            Ok(-1) => KeyTtl::NoExpiry,
            Ok(secs) => KeyTtl::Remaining(secs.max(0) as u64),
            Err(e) => {
                self.stats.record_error();
                warn!(op = "ttl", key, error = %e, "store unavailable, treating as missing");
                KeyTtl::Missing
            }
        }
    }

    // == Expire ==
    /// Adjusts the expiry of an existing entry without touching its value;
    /// zero removes the expiry. No-op when `key` is absent. Best-effort.
    pub async fn expire(&self, key: &str, ttl_secs: u64) {
        let started = Instant::now();
        let full = self.full_key(key);
        match self.bounded(self.backend.expire(&full, ttl_secs)).await {
            Ok(()) => self.trace_op("expire", key, started, "ok"),
            Err(e) => {
                self.stats.record_error();
                warn!(op = "expire", key, error = %e, "expire failed");
            }
        }
    }

    // == Keys ==
    /// Glob enumeration of live keys under this store's prefix, with the
    /// prefix stripped. O(store size); diagnostics only, keep off hot
    /// paths. Fails open to empty.
    pub async fn keys(&self, pattern: &str) -> Vec<String> {
        let full_pattern = self.full_key(pattern);
        match self.bounded(self.backend.scan_keys(&full_pattern)).await {
            Ok(keys) => keys
                .into_iter()
                .filter_map(|k| k.strip_prefix(&self.prefix).map(str::to_string))
                .collect(),
            Err(e) => {
                self.stats.record_error();
                warn!(op = "keys", pattern, error = %e, "enumeration failed");
                Vec::new()
            }
        }
    }

    // == Clear ==
    /// Removes every entry under this store's prefix. Irreversible.
    pub async fn clear(&self) {
        let started = Instant::now();
        let pattern = self.full_key("*");
        let result = async {
            let keys = self.backend.scan_keys(&pattern).await?;
            // Keys come back fully prefixed; delete them as-is.
            self.backend.delete(&keys).await?;
            Ok::<usize, StoreError>(keys.len())
        };
        match self.bounded(result).await {
            Ok(removed) => {
                self.trace_op("clear", &pattern, started, "ok");
                debug!(op = "clear", removed, "namespace cleared");
            }
            Err(e) => {
                self.stats.record_error();
                warn!(op = "clear", error = %e, "clear failed");
            }
        }
    }

    // == Stats ==
    /// Point-in-time statistics snapshot.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}
