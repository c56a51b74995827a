// src/portal/models.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================================================
// Response Envelope
// ============================================================================

/// Standard `{success, data, message}` wrapper used by every portal endpoint
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: Option<bool>,
    pub data: Option<T>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "Request failed".to_string())
    }
}

// ============================================================================
// User Models (raw, normalized into UserProfile at the boundary)
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireUser {
    pub id: Option<Value>,
    pub email: Option<String>,
    #[serde(alias = "user_type")]
    pub user_type: Option<String>,
    pub phone: Option<String>,
    pub designation: Option<String>,
    #[serde(alias = "company_id")]
    pub company_id: Option<Value>,
    #[serde(alias = "first_name")]
    pub first_name: Option<String>,
    #[serde(alias = "last_name")]
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub preferences: Option<WirePreferences>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePreferences {
    #[serde(alias = "profile_completed")]
    pub profile_completed: Option<bool>,
    #[serde(alias = "profile_completion_skipped_until")]
    pub profile_completion_skipped_until: Option<String>,
}

/// `/auth/me` and `PATCH /profile` answer either `{user: {...}}` or the user itself
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UserPayload {
    Wrapped { user: WireUser },
    Bare(WireUser),
}

impl UserPayload {
    pub fn into_user(self) -> WireUser {
        match self {
            UserPayload::Wrapped { user } => user,
            UserPayload::Bare(user) => user,
        }
    }
}

// ============================================================================
// Profile Update Models
// ============================================================================

/// Body of `PATCH /profile`; absent fields are left untouched upstream
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<PreferencesUpdate>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_completion_skipped_until: Option<String>,
}

// ============================================================================
// Company Models
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    pub id: Option<Value>,
    pub name: Option<String>,
    #[serde(alias = "company_account_type")]
    pub company_account_type: Option<String>,
    #[serde(alias = "verification_status")]
    pub verification_status: Option<String>,
    pub industry: Option<String>,
    pub logo: Option<String>,
}

impl CompanyRecord {
    /// Agency-type accounts must pass KYC before posting jobs
    pub fn is_agency(&self) -> bool {
        matches!(
            self.company_account_type.as_deref(),
            Some("recruiting_agency") | Some("consulting_firm")
        )
    }

    pub fn is_verification_pending(&self) -> bool {
        matches!(
            self.verification_status.as_deref(),
            Some("pending") | Some("unverified")
        )
    }

    pub fn requires_kyc(&self) -> bool {
        self.is_agency() && self.is_verification_pending()
    }
}

// ============================================================================
// Dashboard Models
// ============================================================================

/// Aggregate queries over no rows come back as `null`; treat those like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    #[serde(deserialize_with = "null_as_default")]
    pub active_jobs: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub total_applications: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub reviewing_applications: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub shortlisted_applications: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub interview_scheduled_applications: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub profile_views: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub hired_candidates: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub recent_applications: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub recent_jobs: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub recent_hot_vacancies: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicationList {
    #[serde(deserialize_with = "null_as_default")]
    pub applications: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HotVacancyList {
    #[serde(
        alias = "hot_vacancies",
        alias = "vacancies",
        deserialize_with = "null_as_default"
    )]
    pub hot_vacancies: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InterviewList {
    #[serde(deserialize_with = "null_as_default")]
    pub interviews: Vec<Interview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub title: Option<String>,
    pub scheduled_at: Option<String>,
    pub interview_type: Option<String>,
    pub job_application: Option<InterviewApplication>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewApplication {
    pub applicant: Option<Applicant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl Interview {
    /// "First Last" of the applicant, falling back to their email
    pub fn candidate_name(&self) -> Option<String> {
        let applicant = self.job_application.as_ref()?.applicant.as_ref()?;
        let name = [applicant.first_name.as_deref(), applicant.last_name.as_deref()]
            .iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if name.is_empty() {
            applicant.email.clone()
        } else {
            Some(name)
        }
    }
}
