//! Index error types.

use thiserror::Error;

/// Local index operation errors.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for index operations.
pub type IndexResult<T> = std::result::Result<T, IndexError>;
