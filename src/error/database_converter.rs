use crate::error::{AppError, ConstraintParser};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Utility for converting Diesel errors into structured `AppError` variants.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Converts a Diesel error to an appropriate AppError variant.
    ///
    /// Unique violations become [`AppError::Duplicate`] so the user service
    /// can report `duplicateLogin` / `duplicateEmail` for registrations that
    /// lost a race against a concurrent insert.
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                match ConstraintParser::parse_unique_violation(info.message(), info.constraint_name())
                {
                    Some((entity, field, value)) => AppError::Duplicate {
                        entity,
                        field,
                        value,
                    },
                    None => AppError::Database {
                        operation: operation.to_string(),
                        source: anyhow::Error::msg(format!(
                            "Unique constraint violation: {}",
                            info.message()
                        )),
                    },
                }
            }
            DieselError::DatabaseError(kind, info) => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::msg(format!("{:?}: {}", kind, info.message())),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }
}
