//! Episode tracker error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl.
//! Error messages returned to clients are generic; backend detail is logged
//! server-side only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Episode tracker error type.
///
/// Maps to HTTP status codes:
/// - Validation: 400 Bad Request
/// - NotFound: 404 Not Found
/// - MethodNotAllowed: 405 Method Not Allowed
/// - Timeout: 408 Request Timeout
/// - Backend, Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Request timed out")]
    Timeout,

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Internal server error")]
    Internal,
}

impl TrackerError {
    /// Returns the HTTP status code for this error (for logs and metrics).
    pub fn status_code(&self) -> u16 {
        match self {
            TrackerError::Validation(_) => 400,
            TrackerError::NotFound(_) => 404,
            TrackerError::MethodNotAllowed => 405,
            TrackerError::Timeout => 408,
            TrackerError::Backend(_) | TrackerError::Internal => 500,
        }
    }

    /// Error category name used as the `ErrorType` dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            TrackerError::Validation(_) => "ValidationError",
            TrackerError::NotFound(_) => "NotFoundError",
            TrackerError::MethodNotAllowed => "MethodNotAllowedError",
            TrackerError::Timeout => "TimeoutError",
            TrackerError::Backend(_) => "BackendError",
            TrackerError::Internal => "InternalError",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            TrackerError::Validation(reason) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone())
            }
            TrackerError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", resource.clone())
            }
            TrackerError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                "Method not allowed".to_string(),
            ),
            TrackerError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                "REQUEST_TIMEOUT",
                "Request timed out".to_string(),
            ),
            TrackerError::Backend(err) => {
                tracing::error!(target: "tracker.database", error = %err, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            TrackerError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
