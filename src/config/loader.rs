//! Configuration loader for social-users
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "SOCIAL_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "SOCIAL_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "SOCIAL";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// The loader supports the following configuration sources (in order of priority):
/// 1. `default.toml` - Base default configuration (required)
/// 2. `{environment}.toml` - Environment-specific configuration (optional)
/// 3. `local.toml` - Local development overrides (optional)
/// 4. `SOCIAL_*` environment variables (highest priority)
#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    /// When set, layered loading is skipped
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a new configuration loader from the process environment
    ///
    /// This reads `SOCIAL_CONFIG_DIR`, `SOCIAL_CONFIG_FILE` and `SOCIAL_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns an error if both `SOCIAL_CONFIG_DIR` and `SOCIAL_CONFIG_FILE` are set,
    /// as they are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok().map(PathBuf::from);
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_dir.is_some() && config_file.is_some() {
            return Err(ConfigError::mutual_exclusivity(
                "SOCIAL_CONFIG_DIR and SOCIAL_CONFIG_FILE cannot both be set. \
                 Use SOCIAL_CONFIG_DIR for layered configuration or \
                 SOCIAL_CONFIG_FILE for a single configuration file.",
            ));
        }

        Ok(Self::from_parts(
            config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            config_file,
            AppEnvironment::from_env(),
        ))
    }

    /// Create a loader without consulting the process environment for locations
    pub fn from_parts(
        config_dir: PathBuf,
        config_file: Option<PathBuf>,
        environment: AppEnvironment,
    ) -> Self {
        Self {
            config_dir,
            config_file,
            environment,
        }
    }

    /// Load a single file instead of the layered directory
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Override the detected environment
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load and validate configuration from all sources
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `default.toml` (or the single config file) is not found
    /// - Configuration parsing fails
    /// - Configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings = self.load_unvalidated()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load configuration without validating it, so callers can apply
    /// overrides first
    pub fn load_unvalidated(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let mut settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;
        settings.application.environment = self.environment;
        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = if let Some(ref config_file) = self.config_file {
            Self::add_file_source(builder, config_file, true)?
        } else {
            self.build_layered_config(builder)?
        };

        // Environment variables always win: SOCIAL_SERVER__PORT -> server.port
        let builder = Self::add_env_source(builder);

        builder.build().map_err(ConfigError::from)
    }

    fn build_layered_config(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let default_path = self.config_dir.join("default.toml");
        let builder = Self::add_file_source(builder, &default_path, true)?;

        let env_path = self
            .config_dir
            .join(format!("{}.toml", self.environment.as_str()));
        let builder = Self::add_file_source(builder, &env_path, false)?;

        let local_path = self.config_dir.join("local.toml");
        Self::add_file_source(builder, &local_path, false)
    }

    fn add_file_source(
        builder: ConfigBuilder<DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        let name = path.to_str().ok_or_else(|| {
            ConfigError::ParseError(format!("Non UTF-8 configuration path: {}", path.display()))
        })?;
        Ok(builder.add_source(File::new(name, FileFormat::Toml).required(required)))
    }

    fn add_env_source(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackend;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests touching process env vars must not interleave.
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    const DEFAULT_TOML: &str = r#"
[application]
name = "test-app"
version = "1.0.0"

[server]
host = "127.0.0.1"
port = 3000

[storage]
backend = "memory"

[jwt]
secret = "test-secret-that-is-long-enough-0123456789"

[pagination]
default_limit = 10
max_limit = 50

[logger]
level = "info"
"#;

    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            fs::write(temp_dir.path().join(name), content).expect("Failed to write config file");
        }
        temp_dir
    }

    /// Sets env vars for one test and restores them on drop
    struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self {
                vars_to_restore: Vec::new(),
            }
        }

        fn set(&mut self, key: &str, value: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            self.vars_to_restore
                .push((key.to_string(), std::env::var(key).ok()));
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original_value) in self.vars_to_restore.iter().rev() {
                unsafe {
                    match original_value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    fn loader_for(dir: &TempDir, environment: AppEnvironment) -> ConfigLoader {
        ConfigLoader::from_parts(dir.path().to_path_buf(), None, environment)
    }

    #[test]
    fn test_config_loader_new_default() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.remove(CONFIG_DIR_ENV);
        env.remove(CONFIG_FILE_ENV);
        env.remove(AppEnvironment::ENV_VAR);

        let loader = ConfigLoader::new().expect("Should create loader");
        assert_eq!(loader.config_dir(), Path::new("config"));
        assert!(loader.config_file.is_none());
        assert_eq!(loader.environment(), AppEnvironment::Development);
    }

    #[test]
    fn test_config_loader_mutual_exclusivity_error() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.set(CONFIG_DIR_ENV, "/custom/config");
        env.set(CONFIG_FILE_ENV, "/path/to/config.toml");

        match ConfigLoader::new() {
            Err(ConfigError::MutualExclusivityError(msg)) => {
                assert!(msg.contains("SOCIAL_CONFIG_DIR"));
                assert!(msg.contains("SOCIAL_CONFIG_FILE"));
            }
            other => panic!("Expected MutualExclusivityError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_default_toml() {
        let temp_dir = setup_config_dir(&[]);

        match loader_for(&temp_dir, AppEnvironment::Development).load() {
            Err(ConfigError::FileNotFound(msg)) => assert!(msg.contains("default.toml")),
            other => panic!("Expected FileNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_default_toml_only() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let temp_dir = setup_config_dir(&[("default.toml", DEFAULT_TOML)]);

        let settings = loader_for(&temp_dir, AppEnvironment::Development)
            .load()
            .expect("Should load settings");

        assert_eq!(settings.application.name, "test-app");
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.pagination.default_limit, 10);
        // Unset sections fall back to their defaults
        assert_eq!(settings.jwt.token_expiration, 168);
    }

    #[test]
    fn test_load_with_environment_and_local_override() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let production = r#"
[server]
host = "0.0.0.0"
port = 8080

[storage]
backend = "postgres"

[database]
url = "postgres://prod-server/social"
max_connections = 50
"#;
        let local = r#"
[server]
port = 9090
"#;
        let temp_dir = setup_config_dir(&[
            ("default.toml", DEFAULT_TOML),
            ("production.toml", production),
            ("local.toml", local),
        ]);

        let settings = loader_for(&temp_dir, AppEnvironment::Production)
            .load()
            .expect("Should load settings");

        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.storage.backend, StorageBackend::Postgres);
        assert_eq!(settings.database.url, "postgres://prod-server/social");
        assert_eq!(settings.database.max_connections, 50);
        assert_eq!(settings.application.name, "test-app");
        assert_eq!(settings.application.environment, AppEnvironment::Production);
    }

    #[test]
    fn test_load_with_env_var_override() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let mut env = EnvGuard::new();
        env.set("SOCIAL_SERVER__PORT", "7070");
        env.set("SOCIAL_PAGINATION__MAX_LIMIT", "75");

        let temp_dir = setup_config_dir(&[("default.toml", DEFAULT_TOML)]);
        let settings = loader_for(&temp_dir, AppEnvironment::Development)
            .load()
            .expect("Should load settings");

        assert_eq!(settings.server.port, 7070);
        assert_eq!(settings.pagination.max_limit, 75);
    }

    #[test]
    fn test_load_single_file_mode() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let temp_dir = setup_config_dir(&[
            ("default.toml", "[server]\nport = 1111\n"),
            ("custom.toml", DEFAULT_TOML),
        ]);

        let settings = loader_for(&temp_dir, AppEnvironment::Development)
            .with_config_file(temp_dir.path().join("custom.toml"))
            .load()
            .expect("Should load settings");

        assert_eq!(settings.server.port, 3000);
    }

    #[test]
    fn test_load_rejects_invalid_settings() {
        let _guard = TEST_MUTEX.lock().unwrap();
        let temp_dir = setup_config_dir(&[(
            "default.toml",
            "[jwt]\nsecret = \"too-short\"\n",
        )]);
        let loader = loader_for(&temp_dir, AppEnvironment::Development);

        assert!(matches!(
            loader.load(),
            Err(ConfigError::ValidationError { .. })
        ));
        assert!(loader.load_unvalidated().is_ok());
    }
}
