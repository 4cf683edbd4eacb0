//! Registration field rules.
//!
//! Checks run in a fixed order and the first failing rule wins, so a
//! request with a bad login and a bad email always reports `invalidLogin`.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use validator::ValidateEmail;

use crate::error::{AppError, ErrorCode};

pub const LOGIN_MIN_LENGTH: usize = 4;
pub const LOGIN_MAX_LENGTH: usize = 20;
pub const PASSWORD_MIN_LENGTH: usize = 6;
pub const PASSWORD_MAX_LENGTH: usize = 64;
pub const EMAIL_MAX_LENGTH: usize = 254;

static LOGIN_PATTERN: OnceLock<Regex> = OnceLock::new();

/// A registration rule violation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Login did not match the specs")]
    InvalidLogin,
    #[error("Password did not match the specs")]
    InvalidPassword,
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Duplicate login")]
    DuplicateLogin,
    #[error("Duplicate email")]
    DuplicateEmail,
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ValidationError::InvalidLogin => ErrorCode::InvalidLogin,
            ValidationError::InvalidPassword => ErrorCode::InvalidPassword,
            ValidationError::InvalidEmail => ErrorCode::InvalidEmail,
            ValidationError::DuplicateLogin => ErrorCode::DuplicateLogin,
            ValidationError::DuplicateEmail => ErrorCode::DuplicateEmail,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        AppError::BadRequest {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

fn login_pattern() -> &'static Regex {
    LOGIN_PATTERN.get_or_init(|| {
        Regex::new(&format!(
            r"^[A-Za-z0-9_-]{{{},{}}}$",
            LOGIN_MIN_LENGTH, LOGIN_MAX_LENGTH
        ))
        .unwrap()
    })
}

/// Login: 4 to 20 ASCII letters, digits, `_` or `-`.
pub fn validate_login(login: &str) -> bool {
    login_pattern().is_match(login)
}

/// Password: 6 to 64 characters without whitespace, mixing letters and digits.
pub fn validate_password(password: &str) -> bool {
    let length = password.chars().count();
    (PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&length)
        && !password.chars().any(char::is_whitespace)
        && password.chars().any(char::is_alphabetic)
        && password.chars().any(|c| c.is_ascii_digit())
}

pub fn validate_email(email: &str) -> bool {
    email.len() <= EMAIL_MAX_LENGTH && email.validate_email()
}

/// Runs the format rules in order: login, password, email.
pub fn validate_registration(
    login: &str,
    password: &str,
    email: &str,
) -> Result<(), ValidationError> {
    if !validate_login(login) {
        return Err(ValidationError::InvalidLogin);
    }
    if !validate_password(password) {
        return Err(ValidationError::InvalidPassword);
    }
    if !validate_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}
