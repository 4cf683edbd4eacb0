//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseConfig, JwtConfig, PaginationConfig, ServerConfig, Settings, StorageBackend,
};

/// Minimum HS256 secret length
const MIN_JWT_SECRET_LEN: usize = 32;

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Request timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// # Validation Rules
    /// - URL must not be empty and must use a postgres scheme
    /// - Max and min connections must be greater than 0
    /// - Min connections must not exceed max connections
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required. Please specify a valid database connection string.",
            ));
        }

        if !self.is_valid_database_url() {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "database.min_connections".to_string(),
                message: format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            });
        }

        Ok(())
    }

    fn is_valid_database_url(&self) -> bool {
        ["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
    }
}

impl JwtConfig {
    /// Validates the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::validation(
                "jwt.secret",
                "JWT secret cannot be empty",
            ));
        }

        if self.secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::ValidationError {
                field: "jwt.secret".to_string(),
                message: format!(
                    "JWT secret should be at least {} characters for security",
                    MIN_JWT_SECRET_LEN
                ),
            });
        }

        if self.token_expiration <= 0 {
            return Err(ConfigError::validation(
                "jwt.token_expiration",
                "Token expiration must be positive",
            ));
        }

        Ok(())
    }
}

impl PaginationConfig {
    /// Validate page sizes: `1 <= default_limit <= max_limit`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_limit == 0 {
            return Err(ConfigError::validation(
                "pagination.default_limit",
                "Default page limit must be greater than 0.",
            ));
        }

        if self.default_limit > self.max_limit {
            return Err(ConfigError::ValidationError {
                field: "pagination.default_limit".to_string(),
                message: format!(
                    "Default page limit ({}) cannot exceed max page limit ({}).",
                    self.default_limit, self.max_limit
                ),
            });
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// Returns the first validation error encountered. Database settings are
    /// only checked when the postgres backend is selected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        if self.storage.backend == StorageBackend::Postgres {
            self.database.validate()?;
        }
        self.jwt.validate()?;
        self.pagination.validate()?;
        self.logger
            .validate()
            .map_err(|e| ConfigError::validation("logger".to_string(), e.to_string()))?;
        Ok(())
    }
}
