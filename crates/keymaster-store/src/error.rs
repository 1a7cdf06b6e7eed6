//! Store error types.

use thiserror::Error;

/// Message returned when an app name resolves to nothing.
pub const NOT_FOUND: &str = "Not Found";

/// Errors that can occur in the credential store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("The following app names are already bound: {}", .0.join(", "))]
    Conflict(Vec<String>),

    #[error("Invalid credential: {0}")]
    Invalid(String),
}

impl StoreError {
    /// Map a write error on `app_identifiers`, turning a unique index hit into a conflict.
    pub(crate) fn from_identifier_write(err: sqlx::Error, app_name: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Conflict(vec![app_name.to_string()])
            }
            _ => Self::Database(err),
        }
    }
}

/// Convenience result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
