//! Error types for the tiered cache
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for every tier and the combination above them.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key absent or expired. Drives fallthrough to slower tiers.
    #[error("cache miss: {0}")]
    Miss(String),

    /// Value does not fit in the tier
    #[error("value too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    /// Storage or connection failure reported by a tier
    #[error("backend error: {0}")]
    Backend(String),

    /// One or more tiers failed to prune
    #[error("{failures} tier(s) failed to prune:\n{}", .messages.join("\n"))]
    Aggregate {
        failures: usize,
        messages: Vec<String>,
    },

    /// Operation did not finish before its deadline
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// True for the miss outcome, the only error that triggers fallthrough.
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::Miss(_))
    }
}

impl From<tokio_rusqlite::Error> for CacheError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        CacheError::Backend(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Miss(_) => StatusCode::NOT_FOUND,
            CacheError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            CacheError::Backend(_) => StatusCode::BAD_GATEWAY,
            CacheError::Aggregate { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            CacheError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_miss() {
        assert!(CacheError::Miss("k".to_string()).is_miss());
        assert!(!CacheError::Backend("down".to_string()).is_miss());
        assert!(!CacheError::TooLarge { size: 2, limit: 1 }.is_miss());
    }

    #[test]
    fn test_aggregate_message_names_failure_count() {
        let err = CacheError::Aggregate {
            failures: 2,
            messages: vec!["first".to_string(), "second".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("2 tier(s) failed to prune"));
        assert!(msg.contains("first\nsecond"));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (CacheError::Miss("k".into()), StatusCode::NOT_FOUND),
            (
                CacheError::TooLarge { size: 2, limit: 1 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (CacheError::Backend("x".into()), StatusCode::BAD_GATEWAY),
            (
                CacheError::Timeout(Duration::from_millis(5)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (CacheError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
