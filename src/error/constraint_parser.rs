use std::sync::OnceLock;

use regex::Regex;

/// Utility for pulling structured information out of PostgreSQL
/// constraint violation messages.
pub struct ConstraintParser;

/// Matches "Key (field)=(value)" in the DETAIL part of a violation message
static KEY_VALUE: OnceLock<Regex> = OnceLock::new();

impl ConstraintParser {
    fn key_value_pattern() -> &'static Regex {
        KEY_VALUE.get_or_init(|| Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").unwrap())
    }

    /// Parses a unique constraint violation into `(entity, field, value)`.
    ///
    /// The constraint name wins when it follows the `<table>_<column>_key`
    /// convention used by the migrations; the message DETAIL is the fallback.
    pub fn parse_unique_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let detail = Self::extract_key_value_from_message(message);

        if let Some((entity, field)) = constraint_name.and_then(Self::parse_constraint_name) {
            let value = detail
                .map(|(_, value)| value)
                .unwrap_or_else(|| "duplicate_value".to_string());
            return Some((entity, field, value));
        }

        detail.map(|(field, value)| ("resource".to_string(), field, value))
    }

    /// Splits a constraint name such as `users_login_key` into
    /// `("users", "login")`.
    ///
    /// Column names containing underscores are rejoined, so
    /// `follows_follower_id_fkey` yields `("follows", "follower_id")`.
    pub fn parse_constraint_name(constraint_name: &str) -> Option<(String, String)> {
        let parts: Vec<&str> = constraint_name.split('_').collect();
        match parts.as_slice() {
            [entity, field @ .., _suffix] if !field.is_empty() => {
                Some((entity.to_string(), field.join("_")))
            }
            _ => None,
        }
    }

    /// Extracts `(field, value)` from a "Key (field)=(value)" fragment.
    pub fn extract_key_value_from_message(message: &str) -> Option<(String, String)> {
        Self::key_value_pattern().captures(message).and_then(|caps| {
            let field = caps.get(1)?.as_str().to_string();
            let value = caps.get(2)?.as_str().to_string();
            Some((field, value))
        })
    }
}
