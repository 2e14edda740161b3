//! Configuration management for Rill.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Rill uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `RILL_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rill::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("rill.toml")?;
//!
//! println!("Services: {:?}", config.services.target);
//! println!("Namespace: {}", config.document.namespace_uri);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`DocumentConfig`] - Namespace bound to the `tns` prefix
//! - [`ServicesConfig`] - Collaborator selection and timeout
//! - [`HttpServicesConfig`] - Licence and return service endpoints
//! - [`FixtureServicesConfig`] - Offline fixture file
//! - [`ImportConfig`] - User recorded on imported returns
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [services]
//! target = "http"
//! request_timeout_seconds = 30
//!
//! [services.http]
//! licences_url = "https://licences.example.gov.uk/api"
//! returns_url = "https://returns.example.gov.uk/api"
//! api_token = "${RILL_SERVICES_API_TOKEN}"
//!
//! [import]
//! user_email = "import@example.gov.uk"
//! user_type = "internal"
//! entity_id = "00000000-0000-0000-0000-000000000000"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, DocumentConfig, Environment, FixtureServicesConfig, HttpServicesConfig,
    ImportConfig, LoggingConfig, RillConfig, ServicesConfig, ServicesTarget,
};
pub use secret::{secret_string, SecretString, SecretValue};
