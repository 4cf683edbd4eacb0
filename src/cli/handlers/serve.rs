//! Serve command handler
//!
//! Runs the HTTP server, or with `--dry-run` only reports what it would do.

use crate::config::StorageBackend;
use crate::config::settings::Settings;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Starts the server, or prints the plan and exits when `dry_run` is set.
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            for line in self.dry_run_report() {
                println!("{}", line);
            }
            return Ok(());
        }
        Server::new(self.config).run().await
    }

    /// Summary of the validated configuration.
    pub fn dry_run_report(&self) -> Vec<String> {
        let mut report = vec![
            "✓ Configuration is valid".to_string(),
            format!("✓ Server would bind to: {}", self.config.server.address()),
            format!("✓ User store: {}", self.config.storage.backend.as_str()),
        ];
        if self.config.storage.backend == StorageBackend::Postgres {
            report.push(format!(
                "✓ Database pool: {}-{} connections, auto-migrate {}",
                self.config.database.min_connections,
                self.config.database.max_connections,
                if self.config.database.auto_migrate { "on" } else { "off" }
            ));
        }
        report.push(format!(
            "✓ Page size: default {}, max {}",
            self.config.pagination.default_limit, self.config.pagination.max_limit
        ));
        report.push("Dry run completed successfully".to_string());
        report
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
