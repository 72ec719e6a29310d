//! Common error types for Sales Copilot

use thiserror::Error;

/// Common result type for Sales Copilot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the copilot crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON column encoding or decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (e.g. a stored value that cannot be decoded)
    #[error("Internal error: {0}")]
    Internal(String),
}
