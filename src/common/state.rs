// Application state shared across all handlers

use sqlx::SqlitePool;

use super::config::AppConfig;
use crate::portal::PortalClient;
use crate::session::SessionRegistry;

/// Application state containing the storage pool, portal client, and live sessions
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub portal: PortalClient,
    pub config: AppConfig,
    pub sessions: SessionRegistry,
}
