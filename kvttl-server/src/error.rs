//! Error types for the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kvttl_core::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Request failure, classified for the response status.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// A live entry already occupies the key.
    #[error("{0}")]
    Conflict(String),

    /// No live entry for the key.
    #[error("{0}")]
    NotFound(String),

    /// Malformed or out-of-range input.
    #[error("{0}")]
    BadRequest(String),
}

impl From<StoreError<String>> for ApiError {
    fn from(err: StoreError<String>) -> Self {
        match err {
            StoreError::AlreadyExists(_) => ApiError::Conflict(err.to_string()),
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        let message = self.to_string();
        tracing::warn!(status = %status, error = %message, "Client error");

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_mapping() {
        let err: ApiError = StoreError::AlreadyExists("k".to_string()).into();
        assert_eq!(err, ApiError::Conflict("key 'k' already exists".to_string()));

        let err: ApiError = StoreError::NotFound("k".to_string()).into();
        assert_eq!(err, ApiError::NotFound("key 'k' does not exist".to_string()));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::Conflict("c".into()), StatusCode::CONFLICT),
            (ApiError::NotFound("n".into()), StatusCode::NOT_FOUND),
            (ApiError::BadRequest("b".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
