//! Dashboard session routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the session router
///
/// # Routes
/// - `GET /health` - Liveness and open session count
/// - `POST /api/session` - Open or refresh the caller's session
/// - `GET /api/session/state` - Current view state (drains one-shot notices)
/// - `DELETE /api/session` - Close the session and cancel its timers
/// - `POST /api/session/gate/evaluate` - Re-fetch the user and re-run the gate
/// - `POST /api/session/gate/dismiss` - Close the completion dialog
/// - `POST /api/session/gate/skip` - Snooze the completion prompt
/// - `POST /api/session/profile` - Submit the completion form
/// - `GET /api/dashboard` - Aggregated employer dashboard
pub fn session_routes() -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/session",
            post(handlers::open_session).delete(handlers::close_session),
        )
        .route("/api/session/state", get(handlers::session_state))
        .route("/api/session/gate/evaluate", post(handlers::evaluate_gate))
        .route("/api/session/gate/dismiss", post(handlers::dismiss_gate))
        .route("/api/session/gate/skip", post(handlers::skip_gate))
        .route("/api/session/profile", post(handlers::submit_profile))
        .route("/api/dashboard", get(handlers::dashboard))
}
