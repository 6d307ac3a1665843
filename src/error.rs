// src/error.rs

//! Unified error handling for the profiler application.

use std::fmt;

use thiserror::Error;

/// Result type alias for profiler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Coarse classification of an [`AppError`].
///
/// `Forbidden` faults are skipped per redditor, `Cancelled` ends a traversal
/// with partial results, and anything `Fatal` aborts the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The account or content is private, suspended or gone.
    Forbidden,
    /// The run was interrupted.
    Cancelled,
    /// Anything else.
    Fatal,
}

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

    /// CSV writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The platform refused access (HTTP 403)
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// The requested entity does not exist (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unexpected status from the platform
    #[error("API error {status} for {url}")]
    Api { status: u16, url: String },

    /// Response did not have the expected shape
    #[error("Unexpected response from {context}: {message}")]
    Parse { context: String, message: String },

    /// The run was interrupted before it finished
    #[error("Interrupted")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
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

    /// Create a forbidden error for the given resource.
    pub fn forbidden(resource: impl Into<String>) -> Self {
        Self::Forbidden(resource.into())
    }

    /// Create a not-found error for the given resource.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// Create an API error from a status code.
    pub fn api(status: u16, url: impl Into<String>) -> Self {
        Self::Api {
            status,
            url: url.into(),
        }
    }

    /// Create a response parsing error with context.
    pub fn parse(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Classify this error.
    ///
    /// Deleted and shadow-banned accounts answer 404 rather than 403, so
    /// `NotFound` is as recoverable as `Forbidden`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Forbidden(_) | Self::NotFound(_) => ErrorKind::Forbidden,
            Self::Cancelled => ErrorKind::Cancelled,
            _ => ErrorKind::Fatal,
        }
    }
}
