// src/portal/error.rs

use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the upstream job-portal API
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Too many requests: {0}")]
    RateLimited(String),

    #[error("Upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Upstream reported failure: {0}")]
    Api(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl ClientError {
    /// Build an error from a non-success HTTP status and its body message
    pub fn from_status(status: StatusCode, message: String) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS {
            ClientError::RateLimited(message)
        } else {
            ClientError::Status {
                status: status.as_u16(),
                message,
            }
        }
    }

    /// Whether the upstream signalled throttling, either by status or by message
    pub fn is_rate_limited(&self) -> bool {
        match self {
            ClientError::RateLimited(_) => true,
            ClientError::Status { status, .. } if *status == 429 => true,
            other => {
                let message = other.to_string().to_lowercase();
                message.contains("too many requests") || message.contains("rate limit")
            }
        }
    }
}
