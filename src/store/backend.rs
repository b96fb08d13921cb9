//! Backend Trait
//!
//! Raw byte-level contract every backing medium implements. The typed
//! [`Store`](crate::store::Store) facade layers key prefixing, serde and
//! fail-open semantics on top of this.

use async_trait::async_trait;

use crate::error::StoreError;

/// Backing key-value medium: an in-process map for single-instance
/// deployments or a networked Redis store for multi-instance ones.
///
/// Contract notes:
/// - Keys arrive fully prefixed; backends never namespace on their own.
/// - A TTL of zero means "no expiry" everywhere.
/// - `incr` is the one operation that must be atomic across concurrent
///   callers on the same key. The admission controller's correctness
///   depends on it; a get-then-set emulation would undercount concurrent
///   requests and admit more than the configured limit.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Fetch raw bytes, or None if the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store raw bytes, overwriting unconditionally (last-writer-wins).
    async fn set(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> Result<(), StoreError>;

    /// Remove entries; absent keys are not an error.
    async fn delete(&self, keys: &[String]) -> Result<(), StoreError>;

    /// Batch fetch, one slot per input key in input order.
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, StoreError>;

    /// Atomically add `amount` to the integer at `key`, initializing an
    /// absent key at zero. Returns the post-operation value.
    async fn incr(&self, key: &str, amount: i64) -> Result<i64, StoreError>;

    /// Whether a live (non-expired) entry exists for `key`.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Remaining TTL in seconds using the Redis convention:
    /// -2 when the key is missing, -1 when it has no expiry.
    async fn ttl(&self, key: &str) -> Result<i64, StoreError>;

    /// Adjust the expiry of an existing entry without touching its value.
    /// Zero removes the expiry. No-op when the key is absent.
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), StoreError>;

    /// Glob-style key enumeration. O(store size); diagnostics only.
    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    /// Reclaim expired entries eagerly, returning how many were removed.
    /// Backends that expire server-side may report zero.
    async fn sweep_expired(&self) -> Result<usize, StoreError>;
}
