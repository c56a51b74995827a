// src/test_support.rs
//! In-memory fakes shared by the unit tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::common::ui::{Notice, UiSink};
use crate::portal::models::{CompanyRecord, DashboardStats, Interview, ProfileUpdate};
use crate::portal::{ClientError, CompanyDirectory, DashboardApi, ProfileFetcher};
use crate::profile_gate::models::{Preferences, UserProfile, UserType};

pub fn employer() -> UserProfile {
    UserProfile {
        id: "u-100".to_string(),
        email: "hiring@acme.test".to_string(),
        user_type: UserType::Employer,
        phone: Some("+15550100".to_string()),
        designation: Some("Manager".to_string()),
        company_id: Some("c1".to_string()),
        first_name: Some("Dana".to_string()),
        last_name: Some("Reyes".to_string()),
        avatar: None,
        preferences: Preferences::default(),
    }
}

/// Employer fresh from sign-up: nothing filled in beyond phone and company
pub fn new_signup() -> UserProfile {
    UserProfile {
        designation: None,
        ..employer()
    }
}

// ============================================================================
// UI Recorder
// ============================================================================

#[derive(Debug, Default)]
pub struct RecordingUi {
    pub visibility: Mutex<Vec<bool>>,
    pub notices: Mutex<Vec<Notice>>,
    pub navigations: Mutex<Vec<String>>,
}

impl RecordingUi {
    pub fn visibility_changes(&self) -> Vec<bool> {
        self.visibility.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

impl UiSink for RecordingUi {
    fn set_dialog_visible(&self, visible: bool) {
        self.visibility.lock().unwrap().push(visible);
    }

    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    fn navigate(&self, path: &str) {
        self.navigations.lock().unwrap().push(path.to_string());
    }
}

// ============================================================================
// Portal Fake
// ============================================================================

/// Scriptable portal. Each queue is consumed front to back; an empty queue
/// answers with an API failure.
#[derive(Default)]
pub struct FakePortal {
    pub users: Mutex<VecDeque<Result<UserProfile, ClientError>>>,
    pub updates: Mutex<Vec<ProfileUpdate>>,
    pub update_response: Mutex<Option<Result<Option<UserProfile>, ClientError>>>,
    pub company: Mutex<Option<Result<CompanyRecord, ClientError>>>,
    pub stats: Mutex<Option<Result<DashboardStats, ClientError>>>,
    pub applications: Mutex<Option<Result<Vec<Value>, ClientError>>>,
    pub hot_vacancies: Mutex<Option<Result<Vec<Value>, ClientError>>>,
    pub interviews: Mutex<Option<Result<Vec<Interview>, ClientError>>>,
    pub latency: Mutex<Option<Duration>>,
    pub user_calls: AtomicUsize,
    pub company_calls: AtomicUsize,
    pub stats_calls: AtomicUsize,
}

impl FakePortal {
    pub fn push_user(&self, user: Result<UserProfile, ClientError>) {
        self.users.lock().unwrap().push_back(user);
    }

    pub fn set_company(&self, company: Result<CompanyRecord, ClientError>) {
        *self.company.lock().unwrap() = Some(company);
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn take<T>(slot: &Mutex<Option<Result<T, ClientError>>>) -> Result<T, ClientError>
    where
        T: Clone,
    {
        match &*slot.lock().unwrap() {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(e)) => Err(clone_error(e)),
            None => Err(ClientError::Api("not scripted".to_string())),
        }
    }
}

fn clone_error(error: &ClientError) -> ClientError {
    match error {
        ClientError::RateLimited(m) => ClientError::RateLimited(m.clone()),
        ClientError::Status { status, message } => ClientError::Status {
            status: *status,
            message: message.clone(),
        },
        ClientError::InvalidPayload(m) => ClientError::InvalidPayload(m.clone()),
        other => ClientError::Api(other.to_string()),
    }
}

#[async_trait]
impl ProfileFetcher for FakePortal {
    async fn fetch_current_user(&self) -> Result<UserProfile, ClientError> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        self.users
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Api("no user scripted".to_string())))
    }

    async fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> Result<Option<UserProfile>, ClientError> {
        self.updates.lock().unwrap().push(update.clone());
        match &*self.update_response.lock().unwrap() {
            Some(Ok(user)) => Ok(user.clone()),
            Some(Err(e)) => Err(clone_error(e)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CompanyDirectory for FakePortal {
    async fn company(&self, _company_id: &str) -> Result<CompanyRecord, ClientError> {
        self.company_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        Self::take(&self.company)
    }
}

#[async_trait]
impl DashboardApi for FakePortal {
    async fn stats(&self) -> Result<DashboardStats, ClientError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        Self::take(&self.stats)
    }

    async fn recent_applications(&self, _limit: u32) -> Result<Vec<Value>, ClientError> {
        Self::take(&self.applications)
    }

    async fn recent_hot_vacancies(&self, _limit: u32) -> Result<Vec<Value>, ClientError> {
        Self::take(&self.hot_vacancies)
    }

    async fn upcoming_interviews(&self, _limit: u32) -> Result<Vec<Interview>, ClientError> {
        Self::take(&self.interviews)
    }
}
