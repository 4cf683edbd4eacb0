//! Command executor for dispatching CLI commands

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;

/// Runs the parsed command with merged settings. No command means `serve`.
pub async fn execute_command(cli: &Cli, settings: Settings) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings).execute(*dry_run).await
        }
        None => ServeCommandHandler::new(settings).execute(false).await,
        Some(Commands::Migrate { dry_run }) => {
            MigrateCommandHandler::new(settings).execute(*dry_run).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn test_execute_serve_dry_run() {
        let cli = Cli::try_parse_from(["social-users", "serve", "--dry-run"]).unwrap();
        assert!(execute_command(&cli, Settings::default()).await.is_ok());
    }

    #[tokio::test]
    async fn test_execute_migrate_without_database_fails() {
        let cli = Cli::try_parse_from(["social-users", "migrate"]).unwrap();
        assert!(execute_command(&cli, Settings::default()).await.is_err());
    }
}
