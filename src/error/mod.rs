//! Error handling module for verse-timeline

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type at the crate boundary
#[derive(Error, Debug)]
pub enum AppError {
    /// Timeline or lookup failure raised by the domain layer
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Input file not found or inaccessible
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Configuration file could not be used
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for crate operations
pub type AppResult<T> = std::result::Result<T, AppError>;
