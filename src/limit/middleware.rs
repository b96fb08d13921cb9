//! Admission Middleware
//!
//! Axum layer that runs every request through the rate limiter before any
//! handler sees it. Rejected requests get a 429 with a Retry-After header;
//! nothing is forwarded downstream.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::limit::RateLimiter;

/// Client identity for rate limiting: proxy-forwarded address when
/// present, the socket peer address otherwise.
fn client_identity(req: &Request) -> String {
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .map(|s| s.trim().to_string())
        .or(remote)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware entry point; wire with `middleware::from_fn_with_state`.
pub async fn admission_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let client = client_identity(&req);
    let decision = limiter.check(&client).await;

    if !decision.admitted {
        return ApiError::RateLimited(decision.retry_after_secs).into_response();
    }

    next.run(req).await
}
