// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::warn;

use super::validation::ValidationResult;
use crate::portal::ClientError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    ValidationError(String),
    TooManyRequests(String),
    UpstreamError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::TooManyRequests(msg) => write!(f, "Too Many Requests: {}", msg),
            ApiError::UpstreamError(msg) => write!(f, "Upstream Error: {}", msg),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR"),
            ApiError::TooManyRequests(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, msg, "TOO_MANY_REQUESTS")
            }
            ApiError::UpstreamError(msg) => (StatusCode::BAD_GATEWAY, msg, "UPSTREAM_ERROR"),
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        let error_messages: Vec<String> = result
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();

        if error_messages.is_empty() {
            ApiError::ValidationError("Invalid request".to_string())
        } else {
            ApiError::ValidationError(error_messages.join(", "))
        }
    }
}

/// Map portal failures onto the status the browser should see
impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        if err.is_rate_limited() {
            return ApiError::TooManyRequests(
                "Too many requests. Please wait a moment before refreshing.".to_string(),
            );
        }

        match err {
            ClientError::Status { status: 401, message } => ApiError::Unauthorized(message),
            ClientError::Status { status: 404, message } => ApiError::NotFound(message),
            ClientError::Status { status, message } if (400..500).contains(&status) => {
                ApiError::BadRequest(message)
            }
            other => {
                warn!(error = %other, "Portal request failed");
                ApiError::UpstreamError("Job portal is unavailable".to_string())
            }
        }
    }
}
