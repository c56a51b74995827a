// src/logging_middleware.rs
//! Per-request logging: request id, latency, and JSON bodies at debug level

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Larger request bodies are rejected; the completion form is tiny
const MAX_LOGGED_BODY: usize = 64 * 1024;

/// Tag every request with an id, log its outcome, and echo the id back
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let started = Instant::now();
    let (mut parts, body) = request.into_parts();

    let request_id = parts
        .headers
        .get(&REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(REQUEST_ID_HEADER, value);
    }

    let bytes = to_bytes(body, MAX_LOGGED_BODY)
        .await
        .map_err(|_| StatusCode::PAYLOAD_TOO_LARGE)?;
    log_body(&request_id, "request", &bytes);

    let method = parts.method.clone();
    let uri = parts.uri.clone();
    let request = Request::from_parts(parts, Body::from(bytes));

    let response = next.run(request).await;
    let (mut parts, body) = response.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    log_body(&request_id, "response", &bytes);

    let latency_ms = started.elapsed().as_millis() as u64;
    if parts.status.is_server_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            uri = %uri,
            status = parts.status.as_u16(),
            latency_ms,
            "Request failed"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            uri = %uri,
            status = parts.status.as_u16(),
            latency_ms,
            "Request completed"
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(REQUEST_ID_HEADER, value);
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

fn log_body(request_id: &str, direction: &str, bytes: &[u8]) {
    if bytes.is_empty() {
        return;
    }

    let Ok(body_str) = std::str::from_utf8(bytes) else {
        return;
    };

    // Pretty-print JSON when possible
    let rendered = serde_json::from_str::<serde_json::Value>(body_str)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or_else(|| body_str.to_string());

    debug!(request_id = %request_id, direction, body = %rendered, "Body");
}
