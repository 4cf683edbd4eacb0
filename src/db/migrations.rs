//! Embedded diesel migrations.
//!
//! Migrations run over a blocking `PgConnection` on the blocking thread pool,
//! since `diesel_migrations` has no async harness.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{AppError, AppResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn connect(database_url: &str, purpose: &str) -> AppResult<PgConnection> {
    PgConnection::establish(database_url).map_err(|e| AppError::Database {
        operation: format!("establish connection for {}", purpose),
        source: anyhow::anyhow!("Connection error: {}", e),
    })
}

async fn with_blocking_connection<T, F>(database_url: &str, purpose: &'static str, f: F) -> AppResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> AppResult<T> + Send + 'static,
{
    let database_url = database_url.to_string();
    tokio::task::spawn_blocking(move || {
        let mut conn = connect(&database_url, purpose)?;
        f(&mut conn)
    })
    .await
    .map_err(|e| AppError::Internal {
        source: anyhow::Error::from(e),
    })?
}

/// Lists the names of migrations not yet applied.
pub async fn pending_migrations(database_url: &str) -> AppResult<Vec<String>> {
    with_blocking_connection(database_url, "migration check", |conn| {
        let pending = conn
            .pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::Database {
                operation: "check pending migrations".to_string(),
                source: anyhow::anyhow!("Migration error: {}", e),
            })?;
        Ok(pending.iter().map(|m| m.name().to_string()).collect())
    })
    .await
}

/// Applies every pending migration and returns the applied names.
pub async fn run_pending_migrations(database_url: &str) -> AppResult<Vec<String>> {
    with_blocking_connection(database_url, "migrations", |conn| {
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::Database {
                operation: "run pending migrations".to_string(),
                source: anyhow::anyhow!("Migration error: {}", e),
            })?;
        Ok(applied.iter().map(|m| m.to_string()).collect())
    })
    .await
}
