// src/profile_gate/validators.rs

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::common::{ValidationResult, Validator};
use crate::portal::models::ProfileUpdate;

// ============================================================================
// Completion Form
// ============================================================================

/// Fields collected by the "complete your profile" dialog
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: String,
    pub designation: String,
}

impl From<CompleteProfileRequest> for ProfileUpdate {
    fn from(request: CompleteProfileRequest) -> Self {
        let trimmed = |value: Option<String>| {
            value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        ProfileUpdate {
            first_name: trimmed(request.first_name),
            last_name: trimmed(request.last_name),
            phone: Some(request.phone.trim().to_string()),
            designation: Some(request.designation.trim().to_string()),
            preferences: None,
        }
    }
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\+?[0-9][0-9\s\-()]{6,19}$").expect("phone pattern is valid")
    })
}

pub struct CompleteProfileValidator;

impl Validator<CompleteProfileRequest> for CompleteProfileValidator {
    fn validate(&self, data: &CompleteProfileRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let phone = data.phone.trim();
        if phone.is_empty() {
            result.add_error("phone", "Phone number is required");
        } else if !phone_pattern().is_match(phone) {
            result.add_error("phone", "Phone number format is invalid");
        }

        let designation = data.designation.trim();
        if designation.is_empty() {
            result.add_error("designation", "Designation is required");
        } else if designation.len() > 100 {
            result.add_error("designation", "Designation must be less than 100 characters");
        }

        for (field, value) in [("firstName", &data.first_name), ("lastName", &data.last_name)] {
            if let Some(value) = value {
                if value.len() > 100 {
                    result.add_error(field, "Name must be less than 100 characters");
                }
            }
        }

        result
    }
}
