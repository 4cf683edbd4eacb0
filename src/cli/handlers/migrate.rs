//! Migrate command handler
//!
//! Applies, or with `--dry-run` lists, the embedded diesel migrations.

use crate::config::settings::Settings;
use crate::db::{pending_migrations, run_pending_migrations};
use crate::error::AppResult;

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Runs the command against the configured database.
    ///
    /// # Errors
    /// - Invalid database configuration
    /// - Connection or migration failures
    pub async fn execute(&self, dry_run: bool) -> AppResult<()> {
        // The database section is required here whatever the store backend
        self.config.database.validate()?;
        let url = self.config.database.url.as_str();

        if dry_run {
            println!("Checking for pending migrations...");
            let pending = pending_migrations(url).await?;
            if pending.is_empty() {
                println!("✓ No pending migrations found - database is up to date");
            } else {
                println!("Found {} pending migration(s):", pending.len());
                for name in &pending {
                    println!("  - {}", name);
                }
                println!("\nRun without --dry-run to apply these migrations");
            }
            return Ok(());
        }

        println!("Running database migrations...");
        let applied = run_pending_migrations(url).await?;
        if applied.is_empty() {
            println!("✓ No pending migrations - database is up to date");
        } else {
            for name in &applied {
                println!("  ✓ {}", name);
            }
            println!("✓ Applied {} migration(s)", applied.len());
        }
        tracing::info!(count = applied.len(), "Migrations applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_missing_database_url_is_rejected_before_connecting() {
        let handler = MigrateCommandHandler::new(Settings::default());
        let result = handler.execute(true).await;
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }
}
