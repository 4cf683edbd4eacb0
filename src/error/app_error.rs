use crate::error::DatabaseErrorConverter;
use thiserror::Error;

/// Machine-readable codes carried by every client error of the users API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidRequest,
    InvalidLogin,
    InvalidPassword,
    InvalidEmail,
    DuplicateLogin,
    DuplicateEmail,
}

impl ErrorCode {
    /// Wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRequest => "invalidRequest",
            ErrorCode::InvalidLogin => "invalidLogin",
            ErrorCode::InvalidPassword => "invalidPassword",
            ErrorCode::InvalidEmail => "invalidEmail",
            ErrorCode::DuplicateLogin => "duplicateLogin",
            ErrorCode::DuplicateEmail => "duplicateEmail",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-wide error type.
///
/// Client errors carry an [`ErrorCode`]; everything raised by storage, the
/// connection pool or token signing is a server-side failure whose source is
/// kept for logging but never sent to the caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Rejected request with a documented error code (HTTP 400)
    #[error("Bad request ({code}): {message}")]
    BadRequest { code: ErrorCode, message: String },

    /// Unique constraint violation reported by the store
    #[error("Duplicate entry: {entity}.{field} = '{value}' already exists")]
    Duplicate {
        entity: String,
        field: String,
        value: String,
    },

    /// Bearer token missing, malformed, expired or badly signed
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Database operation error with operation context
    #[error("Database operation failed: {operation}")]
    Database {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Connection pool error
    #[error("Connection pool error")]
    ConnectionPool {
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Builds an `invalidRequest` error with the given message.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            code: ErrorCode::InvalidRequest,
            message: message.into(),
        }
    }

    /// Returns the client error code, if this is a client error.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            AppError::BadRequest { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(error: diesel::result::Error) -> Self {
        DatabaseErrorConverter::convert_diesel_error(error, "database operation")
    }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for AppError {
    fn from(error: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        AppError::ConnectionPool {
            source: anyhow::Error::from(error),
        }
    }
}

impl From<crate::config::error::ConfigError> for AppError {
    fn from(error: crate::config::error::ConfigError) -> Self {
        let key = match &error {
            crate::config::error::ConfigError::ValidationError { field, .. } => field.clone(),
            _ => "configuration".to_string(),
        };
        AppError::Configuration {
            key,
            source: anyhow::Error::from(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
