//! Configuration schema types
//!
//! This module defines the configuration structure for Rill.

use crate::config::SecretString;
use crate::core::document::{Namespaces, MULTI_RETURN_NAMESPACE};
use crate::domain::UserType;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Collaborator implementation selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServicesTarget {
    /// Licence and return services over HTTP
    Http,
    /// Static fixture file
    Fixture,
}

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Main Rill configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RillConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    /// Document namespace settings
    #[serde(default)]
    pub document: DocumentConfig,

    /// Collaborator services
    pub services: ServicesConfig,

    /// Defaults for the import context
    pub import: ImportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RillConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.document.validate()?;
        self.services.validate(&self.environment)?;
        self.import.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Document namespace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// URI bound to the `tns` prefix used by all document paths
    #[serde(default = "default_namespace_uri")]
    pub namespace_uri: String,
}

impl DocumentConfig {
    fn validate(&self) -> Result<(), String> {
        if self.namespace_uri.trim().is_empty() {
            return Err("document.namespace_uri cannot be empty".to_string());
        }
        Ok(())
    }

    /// Namespace bindings for reading documents
    pub fn namespaces(&self) -> Namespaces {
        Namespaces::multi_return(self.namespace_uri.clone())
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            namespace_uri: default_namespace_uri(),
        }
    }
}

/// Collaborator services configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// Which implementation to use (http or fixture)
    pub target: ServicesTarget,

    /// Bound on each batched call, in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// HTTP services (required if target = http)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpServicesConfig>,

    /// Fixture file (required if target = fixture)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture: Option<FixtureServicesConfig>,
}

impl ServicesConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        if self.request_timeout_seconds == 0 || self.request_timeout_seconds > 600 {
            return Err(format!(
                "services.request_timeout_seconds must be between 1 and 600, got {}",
                self.request_timeout_seconds
            ));
        }

        // Both sections may be present; only the active one is validated
        match self.target {
            ServicesTarget::Http => match self.http {
                Some(ref config) => config.validate(environment),
                None => Err(
                    "services.http configuration is required when services.target = 'http'"
                        .to_string(),
                ),
            },
            ServicesTarget::Fixture => match self.fixture {
                Some(ref config) => config.validate(),
                None => Err(
                    "services.fixture configuration is required when services.target = 'fixture'"
                        .to_string(),
                ),
            },
        }
    }

    /// Bound on each batched call
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// HTTP collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServicesConfig {
    /// Base URL of the licence service (region lookups)
    pub licences_url: String,

    /// Base URL of the return record service
    pub returns_url: String,

    /// Bearer token sent to both services (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_token: Option<SecretString>,

    /// TLS certificate verification enabled
    ///
    /// Must stay `true` in production (enforced by validation).
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl HttpServicesConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        for (name, url) in [
            ("licences_url", &self.licences_url),
            ("returns_url", &self.returns_url),
        ] {
            if url.is_empty() {
                return Err(format!("services.http.{name} cannot be empty"));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!(
                    "services.http.{name} must start with http:// or https://"
                ));
            }
        }

        if *environment == Environment::Production && !self.tls_verify {
            return Err(
                "TLS certificate verification cannot be disabled in production environments. \
                Set 'tls_verify = true', or use environment = \"development\" or \"staging\" for testing."
                    .to_string(),
            );
        }

        Ok(())
    }
}

/// Fixture collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureServicesConfig {
    /// Path of the TOML fixture file
    pub path: String,
}

impl FixtureServicesConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("services.fixture.path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Defaults for the user recorded on imported returns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Email of the submitting user
    pub user_email: String,

    /// Kind of user (internal or external)
    #[serde(default)]
    pub user_type: UserType,

    /// Entity the user belongs to
    pub entity_id: String,
}

impl ImportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.user_email.trim().is_empty() || !self.user_email.contains('@') {
            return Err(format!(
                "import.user_email must be an email address, got '{}'",
                self.user_email
            ));
        }
        if self.entity_id.trim().is_empty() {
            return Err("import.entity_id cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled = true".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_namespace_uri() -> String {
    MULTI_RETURN_NAMESPACE.to_string()
}

fn default_true() -> bool {
    true
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_local_path() -> String {
    "/var/log/rill".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
