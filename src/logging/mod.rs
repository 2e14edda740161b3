//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output for interactive runs
//! - JSON-formatted logs written to a rotating local file
//! - Configurable log levels
//!
//! # Example
//!
//! ```no_run
//! use rill::logging::init_logging;
//! use rill::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! // Use tracing macros for logging
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of an import
///
/// # Example
///
/// ```no_run
/// use rill::log_import_start;
///
/// log_import_start!(4096, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
/// ```
#[macro_export]
macro_rules! log_import_start {
    ($document_bytes:expr, $checksum:expr) => {
        tracing::info!(
            document_bytes = $document_bytes,
            document_checksum = %$checksum,
            "Starting import"
        );
    };
}

/// Log a batched collaborator call
///
/// # Example
///
/// ```no_run
/// use rill::log_collaborator_call;
///
/// log_collaborator_call!("region resolver", 12);
/// ```
#[macro_export]
macro_rules! log_collaborator_call {
    ($service:expr, $batch_size:expr) => {
        tracing::debug!(
            service = $service,
            batch_size = $batch_size,
            "Calling collaborator"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use rill::log_error_with_context;
/// use rill::domain::RillError;
///
/// let error = RillError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
