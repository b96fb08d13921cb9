//! API Routes
//!
//! Configures the axum router. Every store endpoint sits behind the
//! admission middleware; only /health bypasses it so probes keep working
//! while a client is being limited.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::limit::{admission_middleware, RateLimiter};

use super::handlers::{
    clear_handler, decr_handler, delete_handler, exists_handler, expire_handler, get_handler,
    health_handler, incr_handler, keys_handler, mget_handler, mset_handler, set_handler,
    stats_handler, ttl_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /set`, `GET /get/:key`, `DELETE /del/:key`
/// - `POST /mget`, `PUT /mset`
/// - `POST /incr/:key`, `POST /decr/:key`
/// - `GET /exists/:key`, `GET /ttl/:key`, `POST /expire/:key`
/// - `GET /keys`, `POST /clear`
/// - `GET /stats`, `GET /health`
pub fn create_router(state: AppState, limiter: Arc<RateLimiter>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let gated = Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/del/:key", delete(delete_handler))
        .route("/mget", post(mget_handler))
        .route("/mset", put(mset_handler))
        .route("/incr/:key", post(incr_handler))
        .route("/decr/:key", post(decr_handler))
        .route("/exists/:key", get(exists_handler))
        .route("/ttl/:key", get(ttl_handler))
        .route("/expire/:key", post(expire_handler))
        .route("/keys", get(keys_handler))
        .route("/clear", post(clear_handler))
        .route("/stats", get(stats_handler))
        .layer(middleware::from_fn_with_state(
            limiter,
            admission_middleware,
        ));

    Router::new()
        .merge(gated)
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
