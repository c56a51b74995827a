// src/portal/api.rs
//! Collaborator contracts the dashboard controllers depend on

use async_trait::async_trait;
use serde_json::Value;

use super::error::ClientError;
use super::models::{CompanyRecord, DashboardStats, Interview, ProfileUpdate};
use crate::profile_gate::models::UserProfile;

/// Source of the authoritative server-side user
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    async fn fetch_current_user(&self) -> Result<UserProfile, ClientError>;

    /// Returns the updated user when the portal echoes it back
    async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<Option<UserProfile>, ClientError>;
}

#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    async fn company(&self, company_id: &str) -> Result<CompanyRecord, ClientError>;
}

#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn stats(&self) -> Result<DashboardStats, ClientError>;
    async fn recent_applications(&self, limit: u32) -> Result<Vec<Value>, ClientError>;
    async fn recent_hot_vacancies(&self, limit: u32) -> Result<Vec<Value>, ClientError>;
    async fn upcoming_interviews(&self, limit: u32) -> Result<Vec<Interview>, ClientError>;
}
