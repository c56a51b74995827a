// src/session/registry.rs
//! Live dashboard sessions keyed by bearer token

use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};

use super::extractors::SessionCredentials;
use super::service::DashboardSession;
use crate::common::config::AppConfig;
use crate::common::{safe_token_log, storage_scope};
use crate::portal::{ClientError, CompanyDirectory, DashboardApi, PortalClient, ProfileFetcher};
use crate::profile_gate::SqliteStorage;

struct SessionEntry {
    session: Arc<DashboardSession>,
    last_seen: Instant,
}

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the caller's session and mark it as active
    pub async fn get(&self, token: &str) -> Option<Arc<DashboardSession>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(token)?;
        entry.last_seen = Instant::now();
        Some(entry.session.clone())
    }

    /// Open (or refresh) the caller's session against the portal
    pub async fn open(
        &self,
        credentials: &SessionCredentials,
        pool: &SqlitePool,
        portal: &PortalClient,
        config: &AppConfig,
    ) -> Result<Arc<DashboardSession>, ClientError> {
        let portal = Arc::new(portal.with_token(&credentials.token));
        self.open_with(credentials, portal, pool, config).await
    }

    /// Refresh an existing session, or fetch the user first and build a new one
    /// whose local storage is scoped to that browser or user.
    pub async fn open_with<P>(
        &self,
        credentials: &SessionCredentials,
        portal: Arc<P>,
        pool: &SqlitePool,
        config: &AppConfig,
    ) -> Result<Arc<DashboardSession>, ClientError>
    where
        P: ProfileFetcher + CompanyDirectory + DashboardApi + 'static,
    {
        if let Some(existing) = self.get(&credentials.token).await {
            existing.refresh().await?;
            return Ok(existing);
        }

        let user = portal.fetch_current_user().await?;
        let scope = storage_scope(credentials.client_id.as_deref(), &user.id);

        let session = {
            let mut sessions = self.sessions.write().await;
            let entry = sessions
                .entry(credentials.token.clone())
                .or_insert_with(|| {
                    info!(
                        token = %safe_token_log(&credentials.token),
                        user_id = %user.id,
                        scope = %scope,
                        "Opening dashboard session"
                    );

                    SessionEntry {
                        session: Arc::new(DashboardSession::new(
                            portal,
                            Arc::new(SqliteStorage::new(pool.clone(), scope)),
                            config.gate.clone(),
                            config.redirect.clone(),
                            config.dashboard_list_limit,
                        )),
                        last_seen: Instant::now(),
                    }
                });
            entry.last_seen = Instant::now();
            entry.session.clone()
        };

        session.on_user_changed(user).await;
        Ok(session)
    }

    /// Tear a session down; pending timers are cancelled before it is dropped
    pub async fn remove(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);

        match removed {
            Some(entry) => {
                entry.session.shutdown();
                info!(token = %safe_token_log(token), "Dashboard session closed");
                true
            }
            None => false,
        }
    }

    /// Drop sessions nobody has touched for `max_idle`; returns how many were closed
    pub async fn sweep_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|token, entry| {
            if entry.last_seen.elapsed() < max_idle {
                return true;
            }
            entry.session.shutdown();
            debug!(token = %safe_token_log(token), "Evicting idle dashboard session");
            false
        });

        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "Idle dashboard sessions evicted");
        }
        removed
    }

    /// Start background task evicting idle sessions
    pub fn start_cleanup_task(registry: SessionRegistry, every: Duration, max_idle: Duration) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                registry.sweep_idle(max_idle).await;
            }
        });
    }

    /// Shut down every live session; returns how many were open
    pub async fn close_all(&self) -> usize {
        let drained: Vec<_> = self.sessions.write().await.drain().collect();
        for (_, entry) in &drained {
            entry.session.shutdown();
        }
        drained.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
