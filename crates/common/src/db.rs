//! Shared storage error type
//!
//! Every storage backend reports failures with [`RepositoryError`]. The three
//! outcomes are the only ones services are allowed to branch on.

use thiserror::Error;

/// Storage-level error outcomes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Record violates a uniqueness constraint")]
    DuplicateKey,

    #[error("Storage failure: {0}")]
    Unknown(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::DuplicateKey
            }
            // A dangling reference means the parent row is gone
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::NotFound
            }
            _ => RepositoryError::Unknown(err.to_string()),
        }
    }
}
