use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

/// Error types for the store
#[derive(Error, Debug)]
pub enum StoreError {
    /// A required field is missing or malformed, an enum value is out of set,
    /// or a referenced record does not exist.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The targeted record does not exist.
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A uniqueness or foreign-key constraint rejected the operation,
    /// or a delete is blocked by dependent records.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Any other failure of the backing store. Callers may retry.
    #[error("Storage error: {0}")]
    Storage(#[source] DbErr),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Whether retrying the same operation could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Storage(_))
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => {
                warn!(%message, "Unique constraint violated");
                StoreError::ConstraintViolation(message)
            }
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => {
                warn!(%message, "Foreign key constraint violated");
                StoreError::ConstraintViolation(message)
            }
            _ => {
                error!(?err, "Storage error");
                StoreError::Storage(err)
            }
        }
    }
}

impl From<ValidationErrors> for StoreError {
    fn from(errors: ValidationErrors) -> Self {
        StoreError::Validation(errors.to_string())
    }
}

/// Type alias for Result with StoreError
pub type Result<T> = std::result::Result<T, StoreError>;
