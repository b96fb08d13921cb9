//! Response DTOs for the store API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::store::{KeyTtl, StatsSnapshot};

/// Response body for GET /get/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
}

/// Response body for PUT /set
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub message: String,
    pub key: String,
}

impl SetResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for DELETE /del/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted", key),
            key,
        }
    }
}

/// Response body for POST /mget; one slot per requested key, in order.
#[derive(Debug, Clone, Serialize)]
pub struct MgetResponse {
    pub values: Vec<Option<Value>>,
}

/// Response body for PUT /mset
#[derive(Debug, Clone, Serialize)]
pub struct MsetResponse {
    pub message: String,
    pub count: usize,
}

impl MsetResponse {
    pub fn new(count: usize) -> Self {
        Self {
            message: format!("{count} entries written"),
            count,
        }
    }
}

/// Response body for POST /incr/:key and POST /decr/:key
#[derive(Debug, Clone, Serialize)]
pub struct CounterResponse {
    pub key: String,
    pub value: i64,
}

/// Response body for GET /exists/:key
#[derive(Debug, Clone, Serialize)]
pub struct ExistsResponse {
    pub key: String,
    pub exists: bool,
}

/// Response body for GET /ttl/:key; -1 means no expiry.
#[derive(Debug, Clone, Serialize)]
pub struct TtlResponse {
    pub key: String,
    pub ttl: i64,
}

impl TtlResponse {
    /// Builds the response for a present key; callers map Missing to 404.
    pub fn from_ttl(key: impl Into<String>, ttl: KeyTtl) -> Option<Self> {
        let ttl = match ttl {
            KeyTtl::Missing => return None,
            KeyTtl::NoExpiry => -1,
            KeyTtl::Remaining(secs) => secs as i64,
        };
        Some(Self {
            key: key.into(),
            ttl,
        })
    }
}

/// Response body for POST /expire/:key; ttl zero means the expiry was
/// removed.
#[derive(Debug, Clone, Serialize)]
pub struct ExpireResponse {
    pub message: String,
    pub key: String,
    pub ttl: u64,
}

impl ExpireResponse {
    pub fn new(key: impl Into<String>, ttl: u64) -> Self {
        let key = key.into();
        let message = if ttl > 0 {
            format!("Key '{}' expires in {}s", key, ttl)
        } else {
            format!("Expiry removed from key '{}'", key)
        };
        Self { message, key, ttl }
    }
}

/// Response body for GET /keys
#[derive(Debug, Clone, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
    pub count: usize,
}

impl KeysResponse {
    pub fn new(mut keys: Vec<String>) -> Self {
        keys.sort();
        let count = keys.len();
        Self { keys, count }
    }
}

/// Response body for POST /clear
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

impl ClearResponse {
    pub fn new() -> Self {
        Self {
            message: "Store cleared".to_string(),
        }
    }
}

impl Default for ClearResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
    pub hit_rate: f64,
}

impl From<StatsSnapshot> for StatsResponse {
    fn from(snap: StatsSnapshot) -> Self {
        Self {
            hits: snap.hits,
            misses: snap.misses,
            errors: snap.errors,
            hit_rate: snap.hit_rate,
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
