//! CLI module for social-users
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command handlers for serve and migrate operations

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel, Storage};

use crate::config::settings::Settings;

/// Loads configuration and applies CLI overrides
///
/// 1. Load base configuration from files and `SOCIAL_*` variables
/// 2. Merge CLI argument overrides
/// 3. Validate the final configuration
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<Settings> {
    let merger = ConfigurationMerger::from_cli(cli)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    merger
        .merge_cli_args(cli)
        .map_err(|e| anyhow::anyhow!("Configuration merge error: {}", e))
}
