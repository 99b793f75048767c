//! Mapping of pipeline outcomes onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pipeline::{ErrorKind, NodeFailure};
use serde_json::json;
use thiserror::Error;

/// Errors returned by the API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body is malformed or fails input validation.
    #[error("{0}")]
    InvalidInput(String),

    /// A node failed and the run halted.
    #[error("{0}")]
    Halted(NodeFailure),

    /// The server could not drive the run at all.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error. Halted runs map by failure kind.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Halted(failure) => match failure.error_kind {
                ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ErrorKind::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::Network | ErrorKind::Parse | ErrorKind::Validation => {
                    StatusCode::BAD_GATEWAY
                }
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::InvalidInput(message) => {
                json!({"error_kind": "invalid_input", "message": message})
            }
            ApiError::Halted(failure) => json!(failure),
            ApiError::Internal(message) => json!({"error_kind": "internal", "message": message}),
        };
        (status, Json(body)).into_response()
    }
}
