//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{Environment, FixtureServicesConfig, RillConfig, ServicesTarget};
use super::secret::secret_string;
use crate::domain::errors::RillError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Prefix of environment variables that override configuration values
pub const ENV_PREFIX: &str = "RILL_";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into RillConfig
/// 4. Applies environment variable overrides (RILL_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`RillError::Configuration`] if the file cannot be read or parsed,
/// a referenced environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use rill::config::loader::load_config;
///
/// let config = load_config("rill.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<RillConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(RillError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        RillError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
///
/// # Errors
///
/// Same as [`load_config`], minus file access.
pub fn parse_config(contents: &str) -> Result<RillConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: RillConfig = toml::from_str(&contents)
        .map_err(|e| RillError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config
        .validate()
        .map_err(|e| RillError::Configuration(format!("Configuration validation failed: {e}")))?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. All missing variables are reported
/// together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = placeholder_regex();
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(RillError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    let mut result = lines.join("\n");
    if input.ends_with('\n') {
        result.push('\n');
    }
    Ok(result)
}

fn env(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}")).ok()
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        RillError::Configuration(format!(
            "Invalid value '{value}' for environment variable {ENV_PREFIX}{key}"
        ))
    })
}

/// Applies environment variable overrides using RILL_* prefix
///
/// Environment variables follow the pattern: RILL_<SECTION>_<KEY>
/// For example: RILL_SERVICES_TARGET, RILL_SERVICES_HTTP_LICENCES_URL
fn apply_env_overrides(config: &mut RillConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env("APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = env("ENVIRONMENT") {
        config.environment = match val.to_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            _ => {
                return Err(RillError::Configuration(format!(
                    "Invalid environment '{val}'. Must be one of: development, staging, production"
                )))
            }
        };
    }

    // Document overrides
    if let Some(val) = env("DOCUMENT_NAMESPACE_URI") {
        config.document.namespace_uri = val;
    }

    // Services overrides
    if let Some(val) = env("SERVICES_TARGET") {
        config.services.target = match val.to_lowercase().as_str() {
            "http" => ServicesTarget::Http,
            "fixture" => ServicesTarget::Fixture,
            _ => {
                return Err(RillError::Configuration(format!(
                    "Invalid services target '{val}'. Must be one of: http, fixture"
                )))
            }
        };
    }
    if let Some(val) = env("SERVICES_REQUEST_TIMEOUT_SECONDS") {
        config.services.request_timeout_seconds =
            parse_env("SERVICES_REQUEST_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(ref mut http) = config.services.http {
        if let Some(val) = env("SERVICES_HTTP_LICENCES_URL") {
            http.licences_url = val;
        }
        if let Some(val) = env("SERVICES_HTTP_RETURNS_URL") {
            http.returns_url = val;
        }
        if let Some(val) = env("SERVICES_HTTP_API_TOKEN") {
            http.api_token = Some(secret_string(val));
        }
        if let Some(val) = env("SERVICES_HTTP_TLS_VERIFY") {
            http.tls_verify = parse_env("SERVICES_HTTP_TLS_VERIFY", &val)?;
        }
    }
    if let Some(val) = env("SERVICES_FIXTURE_PATH") {
        match config.services.fixture {
            Some(ref mut fixture) => fixture.path = val,
            None => {
                config.services.fixture = Some(FixtureServicesConfig { path: val })
            }
        }
    }

    // Import overrides
    if let Some(val) = env("IMPORT_USER_EMAIL") {
        config.import.user_email = val;
    }
    if let Some(val) = env("IMPORT_USER_TYPE") {
        config.import.user_type = val.parse().map_err(RillError::Configuration)?;
    }
    if let Some(val) = env("IMPORT_ENTITY_ID") {
        config.import.entity_id = val;
    }

    // Logging overrides
    if let Some(val) = env("LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_env("LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = env("LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = env("LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
