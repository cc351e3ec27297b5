//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {name}")]
    MissingVar { name: String },

    #[error("Invalid value for '{name}': {message}")]
    InvalidValue { name: String, message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Persistence-related errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unsupported store URL '{url}': only sqlite:// is supported")]
    InvalidUrl { url: String },

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to encode rule set: {0}")]
    Serialize(#[from] serde_json::Error),
}
