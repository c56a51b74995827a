// src/agency/redirector.rs
//! Sends agency accounts with pending verification to the KYC flow

use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::common::config::RedirectConfig;
use crate::common::ui::{Notice, UiSink};
use crate::portal::CompanyDirectory;
use crate::profile_gate::models::UserProfile;
use crate::profile_gate::scheduler::ScheduledTask;

pub const KYC_PENDING_MESSAGE: &str =
    "Your agency account needs KYC verification before you can post jobs. Redirecting...";

/// Check in flight for one user and company
struct PendingCheck {
    user_id: String,
    company_id: String,
    task: ScheduledTask,
}

impl PendingCheck {
    fn covers(&self, user_id: &str, company_id: &str) -> bool {
        self.user_id == user_id && self.company_id == company_id && !self.task.is_finished()
    }
}

/// One-shot KYC redirect, re-armed on every user change and independent of the profile gate
pub struct AgencyVerificationRedirector {
    directory: Arc<dyn CompanyDirectory>,
    ui: Arc<dyn UiSink>,
    config: RedirectConfig,
    pending: Mutex<Option<PendingCheck>>,
}

impl AgencyVerificationRedirector {
    pub fn new(
        directory: Arc<dyn CompanyDirectory>,
        ui: Arc<dyn UiSink>,
        config: RedirectConfig,
    ) -> Self {
        Self {
            directory,
            ui,
            config,
            pending: Mutex::new(None),
        }
    }

    /// Start a check for `user`, replacing any previous one unless it covers the
    /// same user and company and is still running. Never blocks and never
    /// fails: lookup errors are logged and dropped.
    pub fn on_user_changed(&self, user: &UserProfile) {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let Some(company_id) = user.company_id.clone() else {
            pending.take();
            debug!(user_id = %user.id, "No company on user, skipping KYC check");
            return;
        };

        // Same user and company with a check still running: let it finish
        if pending
            .as_ref()
            .is_some_and(|check| check.covers(&user.id, &company_id))
        {
            debug!(user_id = %user.id, company_id = %company_id, "KYC check already pending");
            return;
        }
        pending.take();

        let directory = self.directory.clone();
        let ui = self.ui.clone();
        let config = self.config.clone();
        let user_id = user.id.clone();
        let check_company_id = company_id.clone();

        let task = ScheduledTask::spawn(async move {
            let company = match directory.company(&company_id).await {
                Ok(company) => company,
                Err(e) => {
                    warn!(
                        user_id = %user_id,
                        company_id = %company_id,
                        error = %e,
                        "Company lookup for KYC check failed"
                    );
                    return;
                }
            };

            if !company.requires_kyc() {
                return;
            }

            info!(
                user_id = %user_id,
                company_id = %company_id,
                account_type = ?company.company_account_type,
                verification_status = ?company.verification_status,
                "Agency pending verification, redirecting to KYC"
            );
            ui.notify(Notice::warning(KYC_PENDING_MESSAGE));

            tokio::time::sleep(config.delay).await;
            ui.navigate(&config.kyc_path);
        });

        *pending = Some(PendingCheck {
            user_id: user.id.clone(),
            company_id: check_company_id,
            task,
        });
    }

    /// Abort a lookup or redirect still in flight
    pub fn shutdown(&self) {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
    }
}
