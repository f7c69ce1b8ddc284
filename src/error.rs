//! Error types for the profile service.

use thiserror::Error;

/// Common error type for the profile service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Database error.
    ///
    /// Wraps any store failure other than "no rows" and unique-constraint
    /// violations, which have their own variants.
    #[error("database error: {0}")]
    Database(String),

    /// A unique constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Signing or verification key could not be loaded.
    #[error("key error: {0}")]
    Key(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => ServiceError::NotFound("row".to_string()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                ServiceError::Conflict(db_err.message().to_string())
            }
            other => ServiceError::Database(other.to_string()),
        }
    }
}

impl From<crate::auth::TokenError> for ServiceError {
    fn from(e: crate::auth::TokenError) -> Self {
        ServiceError::Key(e.to_string())
    }
}

/// Result type alias for profile service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
