//! Domain error types
//!
//! This module defines the error hierarchy for Rill. Errors here abort a whole
//! import; problems local to a single return are reported as
//! [`RecordFailure`](crate::core::import::outcome::RecordFailure) values instead.

use thiserror::Error;

/// Main Rill error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum RillError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The document is not well-formed per the expected namespace/shape
    #[error("Document parse failure: {0}")]
    Parse(String),

    /// A batched collaborator call failed
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl RillError {
    /// Creates a parse failure for a node missing from `context`
    pub fn missing_element(element: &str, context: &str) -> Self {
        RillError::Parse(format!("Missing required element {element} in {context}"))
    }
}

/// Collaborator service errors
///
/// Errors raised by the region resolver and the return record store.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Failed to connect to the service
    #[error("Failed to connect to service: {0}")]
    ConnectionFailed(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response could not be understood
    #[error("Invalid response from service: {0}")]
    InvalidResponse(String),

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl From<std::io::Error> for RillError {
    fn from(err: std::io::Error) -> Self {
        RillError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RillError {
    fn from(err: serde_json::Error) -> Self {
        RillError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for RillError {
    fn from(err: toml::de::Error) -> Self {
        RillError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<roxmltree::Error> for RillError {
    fn from(err: roxmltree::Error) -> Self {
        RillError::Parse(format!("XML parsing failed: {err}"))
    }
}
