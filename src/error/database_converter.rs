use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

use crate::error::{AppError, ConstraintParser};

/// Maps diesel errors onto structured [`AppError`] variants.
///
/// Constraint violations are parsed into entity/field/value detail where
/// the Postgres message allows it; anything unrecognized stays a generic
/// database error that keeps the original message.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                constraint_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::NotFound {
                entity: "resource".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }
}

fn constraint_error(
    kind: DatabaseErrorKind,
    info: &(dyn DatabaseErrorInformation + Send + Sync),
    operation: &str,
) -> AppError {
    let message = info.message();
    let constraint = info.constraint_name();

    match kind {
        DatabaseErrorKind::UniqueViolation => {
            match ConstraintParser::parse_unique_violation(message, constraint) {
                Some((entity, field, value)) => AppError::Duplicate {
                    entity,
                    field,
                    value,
                },
                None => opaque(operation, format!("Unique constraint violation: {message}")),
            }
        }
        DatabaseErrorKind::NotNullViolation => {
            match ConstraintParser::parse_not_null_violation(message, constraint) {
                Some((entity, field)) => AppError::Validation {
                    field,
                    reason: format!("Field is required for {entity}"),
                },
                None => opaque(
                    operation,
                    format!("Not null constraint violation: {message}"),
                ),
            }
        }
        DatabaseErrorKind::ForeignKeyViolation => {
            match ConstraintParser::parse_foreign_key_violation(message, constraint) {
                Some((entity, field, value)) => AppError::Validation {
                    field,
                    reason: format!("Invalid reference to {entity} with value '{value}'"),
                },
                None => opaque(
                    operation,
                    format!("Foreign key constraint violation: {message}"),
                ),
            }
        }
        _ => opaque(operation, format!("Database error: {message}")),
    }
}

fn opaque(operation: &str, detail: String) -> AppError {
    AppError::Database {
        operation: operation.to_string(),
        source: anyhow::Error::msg(detail),
    }
}
