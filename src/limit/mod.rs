//! Admission Control Module
//!
//! Fixed-window rate limiting keyed by client identity, built on the
//! store's atomic counters, plus the axum middleware that enforces it.

mod limiter;
mod middleware;

pub use limiter::{Decision, RateLimitRecord, RateLimiter};
pub use middleware::admission_middleware;
