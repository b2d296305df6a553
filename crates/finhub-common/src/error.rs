//! Error types shared across FinHub crates

use thiserror::Error;

/// Result type alias for FinHub operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for FinHub
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}
