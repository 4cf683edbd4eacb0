//! Configuration merger for CLI arguments and config files
//!
//! CLI values sit above every other source: files, then `SOCIAL_*`
//! variables, then flags.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

/// Applies CLI overrides on top of file-based configuration.
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads the base configuration the CLI points at.
    ///
    /// `--config` selects a single file, `--env` the environment layer.
    /// The result is not validated yet; [`merge_cli_args`](Self::merge_cli_args)
    /// validates after overrides are applied.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;
        if let Some(path) = &cli.config {
            loader = loader.with_config_file(path);
        }
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }
        Ok(Self::new(loader.load_unvalidated()?))
    }

    /// Returns the base configuration with CLI overrides applied, validated.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            storage,
            log_level,
            dry_run: _,
        }) = &cli.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(storage) = storage {
                config.storage.backend = (*storage).into();
            }
            // Command-level log level beats the global flags
            if let Some(level) = log_level {
                config.logger.level = (*level).into();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}
