//! Configuration Module
//!
//! Loads server configuration from environment variables and validates it
//! at startup. Limiter misconfiguration is fatal: better to refuse to
//! start than to enforce nothing at runtime.

use std::env;

use crate::error::StoreError;

/// Which backing medium holds the store's entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process concurrent map, for single-instance deployments
    Memory,
    /// Networked Redis store, shared by a fleet of stateless processes
    Redis,
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Prefix applied to every store key
    pub key_prefix: String,
    /// Default TTL in seconds for writes without an explicit TTL (0 = none)
    pub default_ttl: u64,
    /// Per-operation backend timeout in milliseconds
    pub op_timeout_ms: u64,
    /// Background expiry sweep interval in seconds
    pub sweep_interval: u64,
    /// Max requests per client per window
    pub rate_limit: u32,
    /// Rate limit window length in seconds
    pub rate_window_secs: u64,
    /// Backing store selection
    pub backend: BackendKind,
    /// Redis connection URL (used when backend = Redis)
    pub redis_url: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `KEY_PREFIX` - store key prefix (default: "gatestore:")
    /// - `DEFAULT_TTL` - default TTL in seconds, 0 = no expiry (default: 300)
    /// - `OP_TIMEOUT_MS` - backend operation timeout (default: 1000)
    /// - `SWEEP_INTERVAL` - expiry sweep frequency in seconds (default: 1)
    /// - `RATE_LIMIT` - requests per client per window (default: 100)
    /// - `RATE_WINDOW_SECS` - window length in seconds (default: 60)
    /// - `STORE_BACKEND` - "memory" or "redis" (default: memory)
    /// - `REDIS_URL` - Redis URL (default: redis://127.0.0.1:6379)
    pub fn from_env() -> Self {
        Self {
            server_port: env_or("SERVER_PORT", 3000),
            key_prefix: env::var("KEY_PREFIX").unwrap_or_else(|_| "gatestore:".to_string()),
            default_ttl: env_or("DEFAULT_TTL", 300),
            op_timeout_ms: env_or("OP_TIMEOUT_MS", 1000),
            sweep_interval: env_or("SWEEP_INTERVAL", 1),
            rate_limit: env_or("RATE_LIMIT", 100),
            rate_window_secs: env_or("RATE_WINDOW_SECS", 60),
            backend: match env::var("STORE_BACKEND").as_deref() {
                Ok("redis") => BackendKind::Redis,
                _ => BackendKind::Memory,
            },
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
        }
    }

    /// Rejects configurations the subsystem cannot run with.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.rate_limit == 0 {
            return Err(StoreError::InvalidConfig(
                "RATE_LIMIT must be at least 1".to_string(),
            ));
        }
        if self.rate_window_secs == 0 {
            return Err(StoreError::InvalidConfig(
                "RATE_WINDOW_SECS must be positive".to_string(),
            ));
        }
        if self.op_timeout_ms == 0 {
            return Err(StoreError::InvalidConfig(
                "OP_TIMEOUT_MS must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            key_prefix: "gatestore:".to_string(),
            default_ttl: 300,
            op_timeout_ms: 1000,
            sweep_interval: 1,
            rate_limit: 100,
            rate_window_secs: 60,
            backend: BackendKind::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
