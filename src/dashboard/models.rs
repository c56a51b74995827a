// src/dashboard/models.rs

use serde::Serialize;
use serde_json::Value;

use crate::portal::models::{CompanyRecord, DashboardStats, Interview};

pub const RATE_LIMITED_MESSAGE: &str =
    "Too many requests. Please wait a moment before refreshing.";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load dashboard data";

// ============================================================================
// View Model
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCards {
    pub active_jobs: i64,
    pub total_applications: i64,
    pub reviewing_applications: i64,
    pub shortlisted_applications: i64,
    pub interview_scheduled_applications: i64,
    pub profile_views: i64,
    pub hired_candidates: i64,
}

impl From<&DashboardStats> for StatCards {
    fn from(stats: &DashboardStats) -> Self {
        Self {
            active_jobs: stats.active_jobs,
            total_applications: stats.total_applications,
            reviewing_applications: stats.reviewing_applications,
            shortlisted_applications: stats.shortlisted_applications,
            interview_scheduled_applications: stats.interview_scheduled_applications,
            profile_views: stats.profile_views,
            hired_candidates: stats.hired_candidates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSummary {
    pub title: String,
    pub scheduled_at: Option<String>,
    pub interview_type: Option<String>,
    pub candidate_name: Option<String>,
}

impl From<Interview> for InterviewSummary {
    fn from(interview: Interview) -> Self {
        let candidate_name = interview.candidate_name();
        Self {
            title: interview.title.unwrap_or_else(|| "Interview".to_string()),
            scheduled_at: interview.scheduled_at,
            interview_type: interview.interview_type,
            candidate_name,
        }
    }
}

/// Everything the employer dashboard renders; each section defaults independently
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub stats: StatCards,
    pub company: Option<CompanyRecord>,
    pub recent_applications: Vec<Value>,
    pub recent_jobs: Vec<Value>,
    pub recent_hot_vacancies: Vec<Value>,
    pub upcoming_interviews: Vec<InterviewSummary>,
}

// ============================================================================
// Outcome
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardFailure {
    RateLimited,
    Generic,
}

impl DashboardFailure {
    pub fn message(&self) -> &'static str {
        match self {
            DashboardFailure::RateLimited => RATE_LIMITED_MESSAGE,
            DashboardFailure::Generic => LOAD_FAILED_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Another load for this session is still running
    AlreadyLoading,
    Loaded {
        view: DashboardView,
        failure: Option<DashboardFailure>,
    },
}
