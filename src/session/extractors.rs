//! Caller identity for dashboard sessions

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use crate::common::ApiError;

/// Header naming the browser's local storage namespace
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Portal bearer token plus the optional browser identifier.
///
/// The token is forwarded upstream untouched; the portal decides whether it is valid.
#[derive(Debug, Clone)]
pub struct SessionCredentials {
    pub token: String,
    pub client_id: Option<String>,
}

impl SessionCredentials {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let raw = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let raw = match raw {
            Some(raw) => raw,
            None => {
                warn!("Session request rejected: missing Authorization header");
                return Err(ApiError::Unauthorized("missing auth".into()));
            }
        };

        // Accept "Bearer <token>" or the raw token
        let token = match raw.strip_prefix("Bearer") {
            Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim(),
            _ => raw,
        };
        if token.is_empty() {
            return Err(ApiError::Unauthorized("missing auth".into()));
        }

        let client_id = headers
            .get(CLIENT_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            token: token.to_string(),
            client_id,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionCredentials
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}
