//! Common error types for the Rumi catalogue

use thiserror::Error;

/// Common result type for catalogue operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the store backends and the HTTP adapter
///
/// A lookup that finds nothing is NOT an error: store lookups return
/// `Ok(None)` and the adapter turns that into a 404.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Natural key or username already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map constraint violations on insert: unique → [`Error::Conflict`],
    /// foreign key → [`Error::InvalidInput`]; pass anything else through
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::Conflict(format!("{} already exists", what))
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                Error::InvalidInput(format!("{} references a missing row", what))
            }
            _ => Error::Database(err),
        }
    }
}
