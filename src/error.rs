// src/error.rs

//! Unified error handling for the backer sync service.

use std::fmt;

use thiserror::Error;

/// Result type alias for backerline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Page 1 could not be read, so the page count is unknown
    #[error("Page count discovery failed with HTTP {status}")]
    Discovery { status: u16 },

    /// A page returned a non-success, non-429 status
    #[error("Fetching page {page} failed with HTTP {status}")]
    PageFetch { page: u32, status: u16 },

    /// Rate limiting outlasted the retry budget
    #[error("Page {page} still rate limited after {attempts} attempts")]
    RetryExhausted { page: u32, attempts: u32 },

    /// Source payload did not have the expected shape
    #[error("Decode error for {context}: {message}")]
    Decode { context: String, message: String },

    /// Persisted snapshot failed its checksum
    #[error("Snapshot integrity error: {0}")]
    Integrity(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a decode error with context.
    pub fn decode(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create an integrity error.
    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity(message.into())
    }

}
