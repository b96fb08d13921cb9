//! Gatestore - a TTL key-value store with admission control
//!
//! A shared cache with per-entry expiry and atomic counters, fronted by a
//! fixed-window rate limiter that gates every request before any handler
//! runs. One store contract, two backings: an in-process map or Redis.

pub mod api;
pub mod config;
pub mod error;
pub mod limit;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use limit::RateLimiter;
pub use store::Store;
pub use tasks::spawn_sweeper_task;
