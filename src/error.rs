//! Unified error handling for the termlink crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while keeping the domain-specific errors
//! available to the stages that produce them.
//!
//! # Architecture
//!
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

pub use crate::utils::error::{DictionaryError, FetchError, InputError, RenderError, SparqlError};

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, rate limit)
    Network,
    /// Malformed responses and pages
    Parsing,
    /// Template and output rendering errors
    Template,
    /// Term list errors
    Input,
    /// Configuration and validation errors
    Config,
    /// File I/O errors
    Io,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Short lowercase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Template => "template",
            Self::Input => "input",
            Self::Config => "config",
            Self::Io => "io",
            Self::Other => "other",
        }
    }
}

/// Unified error type for the termlink crate
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// SPARQL endpoint errors
    #[error("SPARQL error: {0}")]
    Sparql(#[from] SparqlError),

    /// Dictionary lookup errors
    #[error("Dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    /// Rendering errors
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Term list errors
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Sparql(e) => e.is_recoverable(),
            Self::Dictionary(e) => e.is_recoverable(),
            Self::Io(_) => true,
            Self::Render(_) | Self::Input(_) | Self::Json(_) | Self::Config(_) => false,
            Self::Other { .. } => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Sparql(SparqlError::Fetch(_)) => ErrorCategory::Network,
            Self::Sparql(_) => ErrorCategory::Parsing,
            Self::Dictionary(DictionaryError::Fetch(_)) => ErrorCategory::Network,
            Self::Dictionary(_) => ErrorCategory::Parsing,
            Self::Render(_) => ErrorCategory::Template,
            Self::Input(_) => ErrorCategory::Input,
            Self::Io(_) => ErrorCategory::Io,
            Self::Json(_) => ErrorCategory::Parsing,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
