// src/profile_gate/models.rs

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::portal::models::WireUser;
use crate::portal::ClientError;

// ============================================================================
// User Models
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Jobseeker,
    Employer,
    Admin,
    Superadmin,
    Recruiter,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Jobseeker => "jobseeker",
            UserType::Employer => "employer",
            UserType::Admin => "admin",
            UserType::Superadmin => "superadmin",
            UserType::Recruiter => "recruiter",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jobseeker" => Ok(UserType::Jobseeker),
            "employer" => Ok(UserType::Employer),
            "admin" => Ok(UserType::Admin),
            "superadmin" => Ok(UserType::Superadmin),
            "recruiter" => Ok(UserType::Recruiter),
            other => Err(format!("unknown user type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub profile_completed: Option<bool>,
    pub profile_completion_skipped_until: Option<DateTime<Utc>>,
}

/// Server-side user snapshot, validated once when it crosses the API boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub user_type: UserType,
    pub phone: Option<String>,
    pub designation: Option<String>,
    pub company_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub preferences: Preferences,
}

impl UserProfile {
    /// Normalize a raw portal user: ids may be numbers, blank strings mean absent,
    /// unparsable snooze timestamps are dropped
    pub fn from_wire(wire: WireUser) -> Result<Self, ClientError> {
        let id = wire
            .id
            .as_ref()
            .and_then(value_to_string)
            .ok_or_else(|| ClientError::InvalidPayload("user id is missing".to_string()))?;

        let email = non_blank(wire.email)
            .ok_or_else(|| ClientError::InvalidPayload("user email is missing".to_string()))?;

        let user_type = wire
            .user_type
            .as_deref()
            .ok_or_else(|| ClientError::InvalidPayload("user type is missing".to_string()))?
            .parse::<UserType>()
            .map_err(ClientError::InvalidPayload)?;

        let preferences = wire
            .preferences
            .map(|p| Preferences {
                profile_completed: p.profile_completed,
                profile_completion_skipped_until: p
                    .profile_completion_skipped_until
                    .as_deref()
                    .and_then(parse_timestamp),
            })
            .unwrap_or_default();

        Ok(Self {
            id,
            email,
            user_type,
            phone: non_blank(wire.phone),
            designation: non_blank(wire.designation),
            company_id: wire.company_id.as_ref().and_then(value_to_string),
            first_name: non_blank(wire.first_name),
            last_name: non_blank(wire.last_name),
            avatar: non_blank(wire.avatar),
            preferences,
        })
    }

    pub fn is_marked_complete(&self) -> bool {
        self.preferences.profile_completed == Some(true)
    }

    /// Phone and designation are always required; company only for non-admins
    pub fn has_required_fields(&self) -> bool {
        let has_company = self.company_id.is_some() || self.user_type == UserType::Admin;
        self.phone.is_some() && self.designation.is_some() && has_company
    }

    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .iter()
            .flatten()
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

// ============================================================================
// Persisted Completion Record
// ============================================================================

/// Client-local proof that the server once confirmed profile completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCompletionRecord {
    pub completed: bool,
    /// Write time, epoch millis
    pub timestamp: i64,
    pub user_type: String,
}

impl PersistedCompletionRecord {
    pub fn completed_at(user_type: UserType, now: DateTime<Utc>) -> Self {
        Self {
            completed: true,
            timestamp: now.timestamp_millis(),
            user_type: user_type.as_str().to_string(),
        }
    }

    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    /// A record counts only if it is complete, for this user type, and younger than `ttl`
    pub fn is_honored_for(
        &self,
        user_type: UserType,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> bool {
        if !self.completed || self.user_type != user_type.as_str() {
            return false;
        }

        match self.written_at() {
            Some(written) => now.signed_duration_since(written) < ttl,
            None => false,
        }
    }
}

// ============================================================================
// Gate Decision
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateDecision {
    pub show_dialog: bool,
    pub check_done: bool,
}

impl GateDecision {
    pub const HIDE: GateDecision = GateDecision {
        show_dialog: false,
        check_done: true,
    };

    pub const SHOW: GateDecision = GateDecision {
        show_dialog: true,
        check_done: true,
    };
}
