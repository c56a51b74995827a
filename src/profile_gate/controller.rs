// src/profile_gate/controller.rs
//! Decides whether the "complete your profile" dialog interrupts the user

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::{debug, info, warn};

use super::models::{GateDecision, PersistedCompletionRecord, UserProfile};
use super::scheduler::ScheduledTask;
use super::snooze;
use super::store::PersistedCompletionStore;
use crate::common::config::GateConfig;
use crate::common::safe_email_log;
use crate::common::ui::UiSink;
use crate::portal::models::{PreferencesUpdate, ProfileUpdate};
use crate::portal::ProfileFetcher;

#[derive(Debug, Default)]
struct GateState {
    dialog_visible: bool,
    last_decision: Option<GateDecision>,
    /// User whose completion the server confirmed during this session
    completed_user: Option<String>,
    /// Bumped by every evaluation, dismissal and shutdown; stale timers check it
    generation: u64,
    pending_show: Option<ScheduledTask>,
}

struct GateInner {
    store: Arc<dyn PersistedCompletionStore>,
    fetcher: Arc<dyn ProfileFetcher>,
    ui: Arc<dyn UiSink>,
    config: GateConfig,
    state: Mutex<GateState>,
}

impl GateInner {
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn hide_dialog(&self, state: &mut GateState) {
        if state.dialog_visible {
            state.dialog_visible = false;
            self.ui.set_dialog_visible(false);
        }
    }

    /// Fired by the debounce timer
    fn reveal(&self, ticket: u64) {
        let mut state = self.lock();
        if state.generation != ticket {
            debug!(ticket, current = state.generation, "Discarding stale dialog show");
            return;
        }

        state.pending_show.take();
        if !state.dialog_visible {
            state.dialog_visible = true;
            self.ui.set_dialog_visible(true);
        }
    }
}

/// Profile completion gate for one dashboard session
#[derive(Clone)]
pub struct ProfileGateController {
    inner: Arc<GateInner>,
}

impl ProfileGateController {
    pub fn new(
        store: Arc<dyn PersistedCompletionStore>,
        fetcher: Arc<dyn ProfileFetcher>,
        ui: Arc<dyn UiSink>,
        config: GateConfig,
    ) -> Self {
        Self {
            inner: Arc::new(GateInner {
                store,
                fetcher,
                ui,
                config,
                state: Mutex::new(GateState::default()),
            }),
        }
    }

    pub fn dialog_visible(&self) -> bool {
        self.inner.lock().dialog_visible
    }

    pub fn last_decision(&self) -> Option<GateDecision> {
        self.inner.lock().last_decision
    }

    /// Full re-evaluation for a user snapshot. Cancels any pending show; a
    /// "show" decision surfaces the dialog only after the debounce delay.
    pub async fn evaluate(
        &self,
        user: Option<&UserProfile>,
        now: DateTime<Utc>,
    ) -> Option<GateDecision> {
        let ticket = self.begin();

        let user = user?;
        let decision = self.decide(user, now).await;
        self.apply(ticket, decision);

        Some(decision)
    }

    /// User closed the dialog. Nothing is persisted; the next evaluation re-derives.
    pub fn dismiss(&self) {
        let mut state = self.inner.lock();
        state.generation += 1;
        state.pending_show.take();
        self.inner.hide_dialog(&mut state);
        debug!("Profile completion dialog dismissed");
    }

    /// The completion form was accepted upstream: hide the dialog, pull the
    /// authoritative user and re-evaluate so the cache reflects it.
    pub async fn acknowledge_profile_update(
        &self,
        now: DateTime<Utc>,
    ) -> Option<(UserProfile, GateDecision)> {
        self.dismiss();

        let user = match self.inner.fetcher.fetch_current_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Failed to refresh user after profile update");
                return None;
            }
        };

        let decision = self.evaluate(Some(&user), now).await?;
        info!(
            user_id = %user.id,
            show_dialog = decision.show_dialog,
            "Profile update acknowledged"
        );

        Some((user, decision))
    }

    /// "Skip for now": record the skip window upstream and re-evaluate.
    /// When the portal cannot be reached the window is still honored locally.
    pub async fn snooze(&self, user: &UserProfile, now: DateTime<Utc>) -> UserProfile {
        self.dismiss();

        let until = snooze::snooze_until(now, self.inner.config.snooze);
        let update = ProfileUpdate {
            preferences: Some(PreferencesUpdate {
                profile_completion_skipped_until: Some(until.to_rfc3339()),
            }),
            ..Default::default()
        };

        let patched_locally = || {
            let mut patched = user.clone();
            patched.preferences.profile_completion_skipped_until = Some(until);
            patched
        };

        let refreshed = match self.inner.fetcher.update_profile(&update).await {
            Ok(Some(server_user)) => server_user,
            Ok(None) => patched_locally(),
            Err(e) => {
                warn!(
                    user_id = %user.id,
                    error = %e,
                    "Failed to record profile completion skip upstream"
                );
                patched_locally()
            }
        };

        self.evaluate(Some(&refreshed), now).await;
        info!(user_id = %user.id, until = %until, "Profile completion snoozed");

        refreshed
    }

    /// Cancel the pending show; called on session teardown
    pub fn shutdown(&self) {
        let mut state = self.inner.lock();
        state.generation += 1;
        state.pending_show.take();
    }

    fn begin(&self) -> u64 {
        let mut state = self.inner.lock();
        state.generation += 1;
        state.pending_show.take();
        state.generation
    }

    fn apply(&self, ticket: u64, decision: GateDecision) {
        let mut state = self.inner.lock();
        if state.generation != ticket {
            debug!(ticket, current = state.generation, "Superseded gate evaluation");
            return;
        }

        state.last_decision = Some(decision);

        if decision.show_dialog {
            let weak: Weak<GateInner> = Arc::downgrade(&self.inner);
            state.pending_show = Some(ScheduledTask::after(self.inner.config.debounce, async move {
                if let Some(inner) = weak.upgrade() {
                    inner.reveal(ticket);
                }
            }));
        } else {
            self.inner.hide_dialog(&mut state);
        }
    }

    /// Ordered checks, first match wins
    async fn decide(&self, user: &UserProfile, now: DateTime<Utc>) -> GateDecision {
        let inner = &self.inner;

        // Server confirmation dominates everything else for the rest of the session
        if user.is_marked_complete() {
            let record = PersistedCompletionRecord::completed_at(user.user_type, now);
            if let Err(e) = inner.store.write(&record).await {
                warn!(user_id = %user.id, error = %e, "Failed to persist profile completion");
            }
            inner.lock().completed_user = Some(user.id.clone());
            return GateDecision::HIDE;
        }

        if inner.lock().completed_user.as_deref() == Some(user.id.as_str()) {
            return GateDecision::HIDE;
        }

        if inner.config.is_exempt(&user.email) {
            debug!(email = %safe_email_log(&user.email), "User exempt from profile gate");
            return GateDecision::HIDE;
        }

        match inner.store.read().await {
            Ok(Some(record))
                if record.is_honored_for(user.user_type, now, inner.config.cache_ttl) =>
            {
                return GateDecision::HIDE;
            }
            Ok(Some(record)) => {
                debug!(
                    user_id = %user.id,
                    cached_user_type = %record.user_type,
                    "Purging stale or mismatched completion record"
                );
                self.clear_cache().await;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Unreadable completion record, clearing");
                self.clear_cache().await;
            }
        }

        if snooze::is_snoozed(user, now) {
            return GateDecision::HIDE;
        }

        if user.has_required_fields() {
            return GateDecision::HIDE;
        }

        GateDecision::SHOW
    }

    async fn clear_cache(&self) {
        if let Err(e) = self.inner.store.clear().await {
            warn!(error = %e, "Failed to clear completion record");
        }
    }
}
