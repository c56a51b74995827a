// src/dashboard/aggregator.rs
//! Fans out the employer dashboard calls and assembles the view model

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::models::{DashboardFailure, DashboardView, InterviewSummary, LoadOutcome, StatCards};
use crate::common::ui::{Notice, UiSink};
use crate::portal::{ClientError, CompanyDirectory, DashboardApi};

/// Clears the in-flight flag on every exit path
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct DashboardDataAggregator {
    api: Arc<dyn DashboardApi>,
    directory: Arc<dyn CompanyDirectory>,
    ui: Arc<dyn UiSink>,
    list_limit: u32,
    loading: AtomicBool,
}

impl DashboardDataAggregator {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        directory: Arc<dyn CompanyDirectory>,
        ui: Arc<dyn UiSink>,
        list_limit: u32,
    ) -> Self {
        Self {
            api,
            directory,
            ui,
            list_limit,
            loading: AtomicBool::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Load every dashboard section concurrently. A second call while one is
    /// running is rejected rather than queued.
    pub async fn load_all(&self, company_id: Option<&str>) -> LoadOutcome {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Dashboard load already in flight, ignoring request");
            return LoadOutcome::AlreadyLoading;
        }
        let _in_flight = InFlight(&self.loading);

        let limit = self.list_limit;
        let company = async {
            match company_id {
                Some(id) => self.directory.company(id).await.map(Some),
                None => Ok(None),
            }
        };

        let (stats, company, applications, hot_vacancies, interviews) = tokio::join!(
            self.api.stats(),
            company,
            self.api.recent_applications(limit),
            self.api.recent_hot_vacancies(limit),
            self.api.upcoming_interviews(limit),
        );

        let mut view = DashboardView {
            company: section("company", company),
            upcoming_interviews: section("interviews", interviews)
                .into_iter()
                .map(InterviewSummary::from)
                .collect(),
            ..Default::default()
        };

        // The stats call is the umbrella request; it alone decides the user-facing failure
        let failure = match stats {
            Ok(stats) => {
                view.stats = StatCards::from(&stats);
                view.recent_jobs = stats.recent_jobs;
                view.recent_applications = applications.unwrap_or_else(|e| {
                    warn!(error = %e, "Recent applications unavailable, using stats summary");
                    stats.recent_applications
                });
                view.recent_hot_vacancies = hot_vacancies.unwrap_or_else(|e| {
                    warn!(error = %e, "Hot vacancies unavailable, using stats summary");
                    stats.recent_hot_vacancies
                });
                None
            }
            Err(e) => {
                view.recent_applications = section("applications", applications);
                view.recent_hot_vacancies = section("hot_vacancies", hot_vacancies);

                let failure = classify_failure(&e);
                warn!(error = %e, failure = ?failure, "Dashboard stats failed to load");
                self.ui.notify(Notice::error(failure.message()));
                Some(failure)
            }
        };

        info!(
            active_jobs = view.stats.active_jobs,
            interviews = view.upcoming_interviews.len(),
            degraded = failure.is_some(),
            "Dashboard loaded"
        );

        LoadOutcome::Loaded { view, failure }
    }
}

fn classify_failure(error: &ClientError) -> DashboardFailure {
    if error.is_rate_limited() {
        DashboardFailure::RateLimited
    } else {
        DashboardFailure::Generic
    }
}

/// Unwrap one section, degrading to its empty value
fn section<T: Default>(name: &str, result: Result<T, ClientError>) -> T {
    result.unwrap_or_else(|e| {
        warn!(section = %name, error = %e, "Dashboard section failed, using default");
        T::default()
    })
}
