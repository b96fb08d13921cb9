//! API Handlers
//!
//! HTTP request handlers for each store endpoint. The store itself fails
//! open, so most handlers cannot fail; counter endpoints are the exception
//! because their result is the whole point of the call.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::error::{ApiError, ApiResult, StoreError};
use crate::models::{
    ClearResponse, CounterRequest, CounterResponse, DeleteResponse, ExistsResponse, ExpireRequest,
    ExpireResponse, GetResponse, HealthResponse, KeysQuery, KeysResponse, MgetRequest,
    MgetResponse, MsetRequest, MsetResponse, SetRequest, SetResponse, StatsResponse, TtlResponse,
};
use crate::store::Store;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared store facade; clones are handles onto the same backend
    pub store: Store,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> ApiResult<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    state.store.set(&req.key, &req.value, req.ttl).await;
    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<GetResponse>> {
    match state.store.get::<Value>(&key).await {
        Some(value) => Ok(Json(GetResponse { key, value })),
        None => Err(ApiError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Deleting an absent key succeeds; absence is not an error.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    state.store.delete(&key).await;
    Json(DeleteResponse::new(key))
}

/// Handler for POST /mget
pub async fn mget_handler(
    State(state): State<AppState>,
    Json(req): Json<MgetRequest>,
) -> Json<MgetResponse> {
    let values = state.store.mget::<Value>(&req.keys).await;
    Json(MgetResponse { values })
}

/// Handler for PUT /mset
pub async fn mset_handler(
    State(state): State<AppState>,
    Json(req): Json<MsetRequest>,
) -> ApiResult<Json<MsetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let entries: Vec<(String, Value)> = req.entries.into_iter().collect();
    state.store.mset(&entries, req.ttl).await;
    Ok(Json(MsetResponse::new(entries.len())))
}

/// A decode failure means the caller asked for arithmetic on something
/// that is not an integer (or the result would overflow): that is their
/// request, not our availability.
fn counter_error(e: StoreError) -> ApiError {
    match e {
        StoreError::Decode(msg) => ApiError::InvalidRequest(msg),
        other => ApiError::Unavailable(other.to_string()),
    }
}

/// Handler for POST /incr/:key
pub async fn incr_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<CounterRequest>,
) -> ApiResult<Json<CounterResponse>> {
    let amount = req.amount.unwrap_or(1);
    let value = state
        .store
        .increment(&key, amount)
        .await
        .map_err(counter_error)?;
    Ok(Json(CounterResponse { key, value }))
}

/// Handler for POST /decr/:key
pub async fn decr_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<CounterRequest>,
) -> ApiResult<Json<CounterResponse>> {
    let amount = req.amount.unwrap_or(1);
    let value = state
        .store
        .decrement(&key, amount)
        .await
        .map_err(counter_error)?;
    Ok(Json(CounterResponse { key, value }))
}

/// Handler for GET /exists/:key
pub async fn exists_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<ExistsResponse> {
    let exists = state.store.exists(&key).await;
    Json(ExistsResponse { key, exists })
}

/// Handler for GET /ttl/:key
pub async fn ttl_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<TtlResponse>> {
    let ttl = state.store.ttl_remaining(&key).await;
    TtlResponse::from_ttl(key.clone(), ttl)
        .map(Json)
        .ok_or(ApiError::NotFound(key))
}

/// Handler for POST /expire/:key
pub async fn expire_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<ExpireRequest>,
) -> Json<ExpireResponse> {
    state.store.expire(&key, req.ttl).await;
    Json(ExpireResponse::new(key, req.ttl))
}

/// Handler for GET /keys?pattern=...
pub async fn keys_handler(
    State(state): State<AppState>,
    Query(query): Query<KeysQuery>,
) -> Json<KeysResponse> {
    let pattern = query.pattern.as_deref().unwrap_or("*");
    let keys = state.store.keys(pattern).await;
    Json(KeysResponse::new(keys))
}

/// Handler for POST /clear
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.store.clear().await;
    Json(ClearResponse::new())
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.store.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use std::sync::Arc;
    use std::time::Duration;

    fn test_state() -> AppState {
        let store = Store::new(
            Arc::new(MemoryBackend::new()),
            "",
            0,
            Duration::from_millis(500),
        );
        AppState::new(store)
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let req = SetRequest {
            key: "test_key".to_string(),
            value: serde_json::json!("test_value"),
            ttl: None,
        };
        set_handler(State(state.clone()), Json(req)).await.unwrap();

        let Json(response) = get_handler(State(state), Path("test_key".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, serde_json::json!("test_value"));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = test_state();

        let result = get_handler(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_absent_key_succeeds() {
        let state = test_state();

        let Json(response) = delete_handler(State(state), Path("never_set".to_string())).await;
        assert_eq!(response.key, "never_set");
    }

    #[tokio::test]
    async fn test_incr_handler_defaults_to_one() {
        let state = test_state();

        let Json(response) = incr_handler(
            State(state.clone()),
            Path("n".to_string()),
            Json(CounterRequest::default()),
        )
        .await
        .unwrap();
        assert_eq!(response.value, 1);

        let Json(response) = decr_handler(
            State(state),
            Path("n".to_string()),
            Json(CounterRequest { amount: Some(3) }),
        )
        .await
        .unwrap();
        assert_eq!(response.value, -2);
    }

    #[tokio::test]
    async fn test_incr_on_non_integer_is_bad_request() {
        let state = test_state();

        let req = SetRequest {
            key: "word".to_string(),
            value: serde_json::json!("not a number"),
            ttl: None,
        };
        set_handler(State(state.clone()), Json(req)).await.unwrap();

        let result = incr_handler(
            State(state),
            Path("word".to_string()),
            Json(CounterRequest::default()),
        )
        .await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_ttl_handler_missing_is_404() {
        let state = test_state();

        let result = ttl_handler(State(state), Path("nope".to_string())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = test_state();

        let req = SetRequest {
            key: String::new(),
            value: serde_json::json!(null),
            ttl: None,
        };
        let result = set_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }
}
