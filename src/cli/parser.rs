//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::build;
use crate::config::{Environment as AppEnvironment, StorageBackend};

/// User registration and follow listings for the social network
#[derive(Parser, Debug)]
#[command(name = "social-users")]
#[command(about = "User registration and follow listings for the social network")]
#[command(long_about = "
social-users serves the /users endpoint of the social network: registration
with bearer tokens, and paged listings of who follows whom.

EXAMPLES:
    # Start the server with the in-memory store
    social-users serve

    # Start against PostgreSQL on all interfaces
    social-users serve --storage postgres --host 0.0.0.0 --port 8080

    # Use a single configuration file
    social-users --config /etc/social-users/production.toml serve

    # Check configuration without starting the server
    social-users serve --dry-run

    # Apply pending database migrations
    social-users migrate

    # List pending migrations only
    social-users migrate --dry-run
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute (defaults to serve)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Loads this TOML file instead of the layered files in `config/`.
    /// `SOCIAL_*` environment variables still apply on top.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects the `{environment}.toml` layer instead of `SOCIAL_APP_ENV`.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server (default)
    ///
    /// Examples:
    ///   social-users serve                           # Start with defaults
    ///   social-users serve --host 0.0.0.0 --port 80  # Bind to all interfaces on port 80
    ///   social-users serve --dry-run                 # Validate config without starting
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// User store backend
        #[arg(long, value_enum)]
        storage: Option<Storage>,

        /// Log level override, takes precedence over --verbose/--quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Database migration operations
    ///
    /// Examples:
    ///   social-users migrate            # Apply all pending migrations
    ///   social-users migrate --dry-run  # Show pending migrations without applying
    Migrate {
        /// Show pending migrations without applying
        #[arg(long)]
        dry_run: bool,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

impl From<Environment> for AppEnvironment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => AppEnvironment::Development,
            Environment::Test => AppEnvironment::Test,
            Environment::Staging => AppEnvironment::Staging,
            Environment::Production => AppEnvironment::Production,
        }
    }
}

/// Store backend options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Storage {
    #[value(name = "memory")]
    Memory,
    #[value(name = "postgres", alias = "postgresql")]
    Postgres,
}

impl From<Storage> for StorageBackend {
    fn from(storage: Storage) -> Self {
        match storage {
            Storage::Memory => StorageBackend::Memory,
            Storage::Postgres => StorageBackend::Postgres,
        }
    }
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
        .to_string()
    }
}
