//! Gateway error types.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable failure kind carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ValidationError,
    PayloadTooLarge,
    WorkerUnavailable,
    BatchPartialFailure,
}

/// Gateway error type.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or malformed request field.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Request body or audio blob over the configured limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Worker RPC failed or the worker answered `success = false`.
    #[error("Worker unavailable: {0}")]
    WorkerUnavailable(String),

    /// One item of a concurrent batch failed; the whole batch is discarded.
    #[error("Batch item {index} failed: {reason}")]
    BatchPartialFailure { index: usize, reason: String },

    /// Unexpected fault inside the gateway. Reported in the worker-unavailable class.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Validation(_) => ErrorKind::ValidationError,
            GatewayError::PayloadTooLarge(_) => ErrorKind::PayloadTooLarge,
            GatewayError::WorkerUnavailable(_) | GatewayError::Internal(_) => {
                ErrorKind::WorkerUnavailable
            }
            GatewayError::BatchPartialFailure { .. } => ErrorKind::BatchPartialFailure,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::WorkerUnavailable | ErrorKind::BatchPartialFailure => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: ErrorDetail {
                kind: self.kind(),
                message: self.to_string(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::PayloadTooLarge(rejection.body_text())
        } else {
            GatewayError::Validation(rejection.body_text())
        }
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::Validation(rejection.body_text())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Internal(format!("JSON error: {}", e))
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
