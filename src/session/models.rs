// src/session/models.rs

use serde::Serialize;

use super::ui::UiSnapshot;
use crate::dashboard::{DashboardFailure, DashboardView, LoadOutcome};
use crate::profile_gate::models::{GateDecision, UserProfile};

/// View state the browser renders after every interaction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub display_name: Option<String>,
    pub gate: Option<GateDecision>,
    pub ui: UiSnapshot,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<DashboardView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<DashboardFailure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<LoadOutcome> for DashboardResponse {
    fn from(outcome: LoadOutcome) -> Self {
        match outcome {
            LoadOutcome::AlreadyLoading => Self {
                loading: true,
                data: None,
                failure: None,
                error: None,
            },
            LoadOutcome::Loaded { view, failure } => Self {
                loading: false,
                data: Some(view),
                error: failure.map(|f| f.message().to_string()),
                failure,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
