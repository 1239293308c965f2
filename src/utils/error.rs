//! Error types for termlink
//!
//! This module defines the per-concern error types used throughout the
//! resolution pipeline. They are unified into [`crate::error::Error`].

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Server error with status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Resource does not exist (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Whether retrying the same request could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Self::RateLimit | Self::Timeout => true,
            Self::ServerError(status) => matches!(status, 500 | 502 | 503 | 504),
            Self::NotFound(_) | Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors raised while talking to the SPARQL endpoint
#[derive(Error, Debug)]
pub enum SparqlError {
    /// Transport-level failure
    #[error("SPARQL request failed: {0}")]
    Fetch(#[from] FetchError),

    /// Response body was not valid SPARQL JSON results
    #[error("Malformed SPARQL response: {reason}")]
    MalformedResponse { reason: String },

    /// A SELECT row lacked a variable the caller requires
    #[error("Missing binding '{variable}' in SPARQL row")]
    MissingBinding { variable: String },

    /// An ASK query returned a SELECT-shaped result, or vice versa
    #[error("Unexpected SPARQL result shape: expected {expected}")]
    UnexpectedShape { expected: &'static str },
}

impl SparqlError {
    /// Whether retrying the query could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

/// Errors raised by the dictionary lookup service
#[derive(Error, Debug)]
pub enum DictionaryError {
    /// Transport-level failure
    #[error("Dictionary request failed: {0}")]
    Fetch(#[from] FetchError),

    /// The page could not be interpreted as a dictionary entry
    #[error("Dictionary page for '{term}' could not be parsed: {reason}")]
    Parse { term: String, reason: String },

    /// Language name unknown to the dictionary
    #[error("Unsupported dictionary language: {0}")]
    UnsupportedLanguage(String),
}

impl DictionaryError {
    /// Whether retrying the lookup could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

/// Errors raised while rendering a record to Turtle
#[derive(Error, Debug)]
pub enum RenderError {
    /// Template failed to register
    #[error("Failed to register template '{name}': {reason}")]
    TemplateRegistration { name: String, reason: String },

    /// Template rendering failed (including missing slots in strict mode)
    #[error("Failed to render template '{name}': {reason}")]
    Template { name: String, reason: String },

    /// A value would be read back as a template placeholder
    #[error("Value for '{field}' collides with a template placeholder: {value:?}")]
    PlaceholderCollision { field: String, value: String },

    /// A required field was empty
    #[error("Required field '{field}' is empty")]
    MissingField { field: String },
}

/// Errors raised while reading a term list
#[derive(Error, Debug)]
pub enum InputError {
    /// File could not be read
    #[error("Failed to read term list {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Unknown input format name
    #[error("Unknown term list format: {0}")]
    UnknownFormat(String),
}
