// src/portal/client.rs
//! HTTP client for the upstream job-portal REST API

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::api::{CompanyDirectory, DashboardApi, ProfileFetcher};
use super::error::ClientError;
use super::models::{
    ApplicationList, CompanyRecord, DashboardStats, Envelope, HotVacancyList, Interview,
    InterviewList, ProfileUpdate, UserPayload,
};
use crate::common::safe_token_log;
use crate::profile_gate::models::UserProfile;

const CURRENT_USER_ENDPOINT: &str = "/auth/me";
const PROFILE_ENDPOINT: &str = "/profile";
const COMPANY_ENDPOINT: &str = "/employer/company";
const DASHBOARD_STATS_ENDPOINT: &str = "/employer/dashboard/stats";
const APPLICATIONS_ENDPOINT: &str = "/employer/applications";
const HOT_VACANCIES_ENDPOINT: &str = "/hot-vacancies/my";
const UPCOMING_INTERVIEWS_ENDPOINT: &str = "/employer/interviews/upcoming";

/// Portal client bound to one user's bearer token
#[derive(Debug, Clone)]
pub struct PortalClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl PortalClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Same connection pool, different caller
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: Some(token.to_string()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and unwrap the `{success, data}` envelope
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>, ClientError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
            warn!(
                status = %status,
                token = %self.token.as_deref().map(safe_token_log).unwrap_or_default(),
                message = %message,
                "Portal request failed"
            );
            return Err(ClientError::from_status(status, message));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| ClientError::InvalidPayload(e.to_string()))?;

        if envelope.success == Some(false) {
            return Err(ClientError::Api(envelope.failure_message()));
        }

        Ok(envelope.data)
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!(url = %url, "Portal GET");

        self.send(self.http.get(&url))
            .await?
            .ok_or_else(|| ClientError::InvalidPayload(format!("{} returned no data", path)))
    }
}

/// Pull `message` or `error` out of an error body, if it is JSON
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json.get("message")
        .or_else(|| json.get("error"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

#[async_trait]
impl ProfileFetcher for PortalClient {
    async fn fetch_current_user(&self) -> Result<UserProfile, ClientError> {
        let payload: UserPayload = self.get_data(CURRENT_USER_ENDPOINT).await?;
        UserProfile::from_wire(payload.into_user())
    }

    async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<Option<UserProfile>, ClientError> {
        let url = self.url(PROFILE_ENDPOINT);
        debug!(url = %url, "Portal PATCH");

        let payload: Option<UserPayload> = self.send(self.http.patch(&url).json(update)).await?;

        // Some deployments answer with a bare acknowledgement instead of the user
        match payload {
            Some(payload) => Ok(UserProfile::from_wire(payload.into_user()).ok()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CompanyDirectory for PortalClient {
    async fn company(&self, company_id: &str) -> Result<CompanyRecord, ClientError> {
        self.get_data(&format!("{}/{}", COMPANY_ENDPOINT, company_id))
            .await
    }
}

#[async_trait]
impl DashboardApi for PortalClient {
    async fn stats(&self) -> Result<DashboardStats, ClientError> {
        self.get_data(DASHBOARD_STATS_ENDPOINT).await
    }

    async fn recent_applications(&self, limit: u32) -> Result<Vec<Value>, ClientError> {
        let list: ApplicationList = self
            .get_data(&format!("{}?limit={}", APPLICATIONS_ENDPOINT, limit))
            .await?;
        Ok(list.applications)
    }

    async fn recent_hot_vacancies(&self, limit: u32) -> Result<Vec<Value>, ClientError> {
        let list: HotVacancyList = self
            .get_data(&format!("{}?limit={}", HOT_VACANCIES_ENDPOINT, limit))
            .await?;
        Ok(list.hot_vacancies)
    }

    async fn upcoming_interviews(&self, limit: u32) -> Result<Vec<Interview>, ClientError> {
        let list: InterviewList = self
            .get_data(&format!("{}?limit={}", UPCOMING_INTERVIEWS_ENDPOINT, limit))
            .await?;
        Ok(list.interviews)
    }
}
