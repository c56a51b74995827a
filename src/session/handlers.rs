use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::extractors::SessionCredentials;
use super::models::{DashboardResponse, HealthResponse, MessageResponse};
use super::service::DashboardSession;
use crate::common::{safe_token_log, ApiError, AppState, Validator};
use crate::profile_gate::validators::{CompleteProfileRequest, CompleteProfileValidator};

type SharedState = Extension<Arc<RwLock<AppState>>>;

async fn existing_session(
    state: &Arc<RwLock<AppState>>,
    credentials: &SessionCredentials,
) -> Result<Arc<DashboardSession>, ApiError> {
    let sessions = state.read().await.sessions.clone();
    sessions
        .get(&credentials.token)
        .await
        .ok_or_else(|| ApiError::NotFound("No dashboard session open".to_string()))
}

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health(Extension(state): SharedState) -> impl IntoResponse {
    let sessions = state.read().await.sessions.clone();
    Json(HealthResponse {
        status: "ok",
        sessions: sessions.len().await,
    })
}

// ============================================================================
// Session Lifecycle
// ============================================================================

/// POST /api/session - open (or refresh) the caller's dashboard session
pub async fn open_session(
    Extension(state): SharedState,
    credentials: SessionCredentials,
) -> Result<impl IntoResponse, ApiError> {
    let app_state = state.read().await.clone();
    let session = app_state
        .sessions
        .open(&credentials, &app_state.db, &app_state.portal, &app_state.config)
        .await?;

    if let Some(user) = session.current_user().await {
        info!(
            user_id = %user.id,
            user_type = %user.user_type,
            token = %safe_token_log(&credentials.token),
            "Dashboard session refreshed"
        );
    }

    Ok(Json(session.state().await))
}

/// GET /api/session/state
pub async fn session_state(
    Extension(state): SharedState,
    credentials: SessionCredentials,
) -> Result<impl IntoResponse, ApiError> {
    let session = existing_session(&state, &credentials).await?;
    Ok(Json(session.state().await))
}

/// DELETE /api/session
pub async fn close_session(
    Extension(state): SharedState,
    credentials: SessionCredentials,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = state.read().await.sessions.clone();

    if !sessions.remove(&credentials.token).await {
        return Err(ApiError::NotFound("No dashboard session open".to_string()));
    }

    Ok(Json(MessageResponse {
        message: "Session closed".to_string(),
    }))
}

// ============================================================================
// Profile Completion Gate
// ============================================================================

/// POST /api/session/gate/evaluate - route change: pull the user and re-run the gate
pub async fn evaluate_gate(
    Extension(state): SharedState,
    credentials: SessionCredentials,
) -> Result<impl IntoResponse, ApiError> {
    let session = existing_session(&state, &credentials).await?;
    session.refresh().await?;
    Ok(Json(session.state().await))
}

/// POST /api/session/gate/dismiss
pub async fn dismiss_gate(
    Extension(state): SharedState,
    credentials: SessionCredentials,
) -> Result<impl IntoResponse, ApiError> {
    let session = existing_session(&state, &credentials).await?;
    session.dismiss_dialog();
    Ok(Json(session.state().await))
}

/// POST /api/session/gate/skip - "skip for now"
pub async fn skip_gate(
    Extension(state): SharedState,
    credentials: SessionCredentials,
) -> Result<impl IntoResponse, ApiError> {
    let session = existing_session(&state, &credentials).await?;

    if session.skip_completion().await.is_none() {
        return Err(ApiError::BadRequest("No user loaded for this session".to_string()));
    }

    Ok(Json(session.state().await))
}

/// POST /api/session/profile - submit the completion form
pub async fn submit_profile(
    Extension(state): SharedState,
    credentials: SessionCredentials,
    Json(request): Json<CompleteProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    CompleteProfileValidator.validate(&request).into_result()?;

    let session = existing_session(&state, &credentials).await?;
    let decision = session.submit_completion(request.into()).await?;
    debug!(decision = ?decision, "Completion form processed");

    Ok(Json(session.state().await))
}

// ============================================================================
// Dashboard
// ============================================================================

/// GET /api/dashboard
pub async fn dashboard(
    Extension(state): SharedState,
    credentials: SessionCredentials,
) -> Result<impl IntoResponse, ApiError> {
    let session = existing_session(&state, &credentials).await?;
    let response = DashboardResponse::from(session.load_dashboard().await);

    let status = if response.loading {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(response)))
}
