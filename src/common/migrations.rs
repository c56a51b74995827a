// src/common/migrations.rs
//! Schema for the service's local SQLite database

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Rows untouched for this long belong to browsers that never came back
const STALE_ENTRY_DAYS: i64 = 90;

/// Create the schema, optionally wiping it first when RESET_DB=true
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("RESET_DB=true - dropping client storage");
        sqlx::query("DROP TABLE IF EXISTS client_storage")
            .execute(pool)
            .await?;
    }

    create_client_storage_table(pool).await?;
    purge_stale_entries(pool).await?;

    info!("Database migration completed");
    Ok(())
}

async fn create_client_storage_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Stand-in for browser localStorage, one namespace per client
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS client_storage (
            scope TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT DEFAULT (datetime('now')),
            PRIMARY KEY (scope, key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_client_storage_updated_at ON client_storage(updated_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn purge_stale_entries(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM client_storage WHERE updated_at < datetime('now', ?)",
    )
    .bind(format!("-{} days", STALE_ENTRY_DAYS))
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        info!(
            removed = result.rows_affected(),
            "Purged stale client storage entries"
        );
    }

    Ok(())
}
