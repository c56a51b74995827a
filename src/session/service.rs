// src/session/service.rs
//! One browser's employer dashboard: user snapshot plus the controllers reacting to it

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::models::SessionState;
use super::ui::SessionUi;
use crate::agency::AgencyVerificationRedirector;
use crate::common::config::{GateConfig, RedirectConfig};
use crate::dashboard::{DashboardDataAggregator, LoadOutcome};
use crate::portal::models::ProfileUpdate;
use crate::portal::{ClientError, CompanyDirectory, DashboardApi, ProfileFetcher};
use crate::profile_gate::models::{GateDecision, UserProfile};
use crate::profile_gate::{CompletionCache, KeyValueStore, ProfileGateController, UserBlobCache};

pub struct DashboardSession {
    profiles: Arc<dyn ProfileFetcher>,
    user: RwLock<Option<UserProfile>>,
    user_blob: UserBlobCache,
    gate: ProfileGateController,
    redirector: AgencyVerificationRedirector,
    aggregator: DashboardDataAggregator,
    ui: Arc<SessionUi>,
}

impl DashboardSession {
    pub fn new<P>(
        portal: Arc<P>,
        storage: Arc<dyn KeyValueStore>,
        gate_config: GateConfig,
        redirect_config: RedirectConfig,
        list_limit: u32,
    ) -> Self
    where
        P: ProfileFetcher + CompanyDirectory + DashboardApi + 'static,
    {
        let ui = Arc::new(SessionUi::new());

        let gate = ProfileGateController::new(
            Arc::new(CompletionCache::new(storage.clone())),
            portal.clone(),
            ui.clone(),
            gate_config,
        );
        let redirector =
            AgencyVerificationRedirector::new(portal.clone(), ui.clone(), redirect_config);
        let aggregator =
            DashboardDataAggregator::new(portal.clone(), portal.clone(), ui.clone(), list_limit);

        Self {
            profiles: portal,
            user: RwLock::new(None),
            user_blob: UserBlobCache::new(storage),
            gate,
            redirector,
            aggregator,
            ui,
        }
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.user.read().await.clone()
    }

    /// Pull the server user and run every user-change reaction
    pub async fn refresh(&self) -> Result<UserProfile, ClientError> {
        let user = self.profiles.fetch_current_user().await?;
        self.on_user_changed(user.clone()).await;
        Ok(user)
    }

    /// Gate and KYC redirect both react to a new user; the redirect runs in the
    /// background so it never delays the gate decision.
    pub async fn on_user_changed(&self, user: UserProfile) -> Option<GateDecision> {
        self.remember(&user).await;
        self.redirector.on_user_changed(&user);
        self.gate.evaluate(Some(&user), Utc::now()).await
    }

    pub fn dismiss_dialog(&self) {
        self.gate.dismiss();
    }

    /// "Skip for now" on the completion dialog
    pub async fn skip_completion(&self) -> Option<UserProfile> {
        let user = self.current_user().await?;
        let refreshed = self.gate.snooze(&user, Utc::now()).await;
        self.remember(&refreshed).await;
        Some(refreshed)
    }

    /// Completion form accepted by the caller's validation: send it upstream,
    /// then let the gate refresh and settle.
    pub async fn submit_completion(
        &self,
        update: ProfileUpdate,
    ) -> Result<Option<GateDecision>, ClientError> {
        self.profiles.update_profile(&update).await?;

        match self.gate.acknowledge_profile_update(Utc::now()).await {
            Some((user, decision)) => {
                self.remember(&user).await;
                self.redirector.on_user_changed(&user);
                info!(user_id = %user.id, "Profile completion submitted");
                Ok(Some(decision))
            }
            None => Ok(None),
        }
    }

    pub async fn load_dashboard(&self) -> LoadOutcome {
        let company_id = self
            .user
            .read()
            .await
            .as_ref()
            .and_then(|u| u.company_id.clone());

        self.aggregator.load_all(company_id.as_deref()).await
    }

    pub async fn state(&self) -> SessionState {
        let user = self.current_user().await;
        let display_name = match &user {
            Some(user) if user.first_name.is_some() || user.last_name.is_some() => {
                Some(user.display_name())
            }
            _ => self.user_blob.display_name().await,
        };

        SessionState {
            user,
            display_name,
            gate: self.gate.last_decision(),
            ui: self.ui.drain(),
        }
    }

    /// Cancel every pending timer; the session must not touch the view afterwards
    pub fn shutdown(&self) {
        self.gate.shutdown();
        self.redirector.shutdown();
        debug!("Dashboard session shut down");
    }

    async fn remember(&self, user: &UserProfile) {
        *self.user.write().await = Some(user.clone());

        match serde_json::to_value(user) {
            Ok(blob) => {
                if let Err(e) = self.user_blob.save(&blob).await {
                    warn!(user_id = %user.id, error = %e, "Failed to cache user blob");
                }
            }
            Err(e) => warn!(user_id = %user.id, error = %e, "Failed to serialize user blob"),
        }
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
