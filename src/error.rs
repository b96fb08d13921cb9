//! Error types for the store and the HTTP surface
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error Enum ==
/// Failures originating in the key-value store subsystem.
///
/// None of these are ever surfaced to an end user as a request failure:
/// reads degrade to a miss, the admission controller degrades to admit,
/// and configuration problems abort startup before any request is served.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing medium unreachable or the operation timed out
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Stored bytes could not be interpreted as the expected value shape
    #[error("decode failure: {0}")]
    Decode(String),

    /// Malformed parameters detected at construction; fatal at startup
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

// == API Error Enum ==
/// Errors returned from HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Key not found in the store
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request rejected by the admission controller
    #[error("Rate limit exceeded, retry after {0}s")]
    RateLimited(u64),

    /// Backing store could not serve a counter operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        match self {
            ApiError::RateLimited(retry_after_secs) => (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(json!({
                    "error": "rate limit exceeded",
                    "retry_after_secs": retry_after_secs
                })),
            )
                .into_response(),
            _ => {
                let body = Json(json!({
                    "error": self.to_string()
                }));
                (status, body).into_response()
            }
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));

        let err = StoreError::Decode("not an integer".to_string());
        assert!(err.to_string().contains("decode failure"));
    }

    #[test]
    fn test_rate_limited_response_has_retry_after() {
        let response = ApiError::RateLimited(30).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "30");
    }

    #[test]
    fn test_not_found_response_status() {
        let response = ApiError::NotFound("missing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
