// src/error.rs

//! Unified error handling for the site functions.

use std::fmt;

use thiserror::Error;

/// Result type alias for handler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// AWS S3 error
    #[error("S3 error: {0}")]
    S3(String),

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

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Pub/sub payload was not valid base64
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// CMS document type is neither a recipe nor a blog post
    #[error("Unknown document kind: {0}")]
    UnknownDocumentKind(String),

    /// Content API returned no document for the requested ref
    #[error("No document found for ref {0}")]
    DocumentNotFound(String),

    /// External API answered with a non-success status
    #[error("{service} responded with {status}: {message}")]
    Api {
        service: String,
        status: u16,
        message: String,
    },
}

impl AppError {
    /// Create an S3 error.
    pub fn s3(message: impl fmt::Display) -> Self {
        Self::S3(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an API error for a failed response.
    pub fn api(service: impl Into<String>, status: u16, message: impl fmt::Display) -> Self {
        Self::Api {
            service: service.into(),
            status,
            message: message.to_string(),
        }
    }

    /// Whether the error was caused by the caller's input rather than by
    /// a collaborator failing.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::UnknownDocumentKind(_) | Self::Base64(_)
        )
    }
}
