//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold `ENV_MUTEX` to avoid
//! interfering with each other.

use rill::config::{load_config, Environment, ServicesTarget};
use rill::domain::UserType;
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("RILL_APPLICATION_LOG_LEVEL");
    std::env::remove_var("RILL_SERVICES_TARGET");
    std::env::remove_var("RILL_SERVICES_REQUEST_TIMEOUT_SECONDS");
    std::env::remove_var("RILL_SERVICES_HTTP_LICENCES_URL");
    std::env::remove_var("RILL_SERVICES_FIXTURE_PATH");
    std::env::remove_var("RILL_IMPORT_USER_TYPE");
    std::env::remove_var("TEST_RILL_API_TOKEN");
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(contents.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let toml_content = r#"
environment = "staging"

[application]
log_level = "debug"

[document]
namespace_uri = "urn:example:returns"

[services]
target = "http"
request_timeout_seconds = 45

[services.http]
licences_url = "https://licences.example.gov.uk/api"
returns_url = "https://returns.example.gov.uk/api"
api_token = "token-123"
tls_verify = false

[import]
user_email = "import@example.gov.uk"
user_type = "external"
entity_id = "entity-1"

[logging]
local_enabled = true
local_path = "/tmp/rill-logs"
local_rotation = "hourly"
"#;

    let temp_file = write_config(toml_content);
    let config = load_config(temp_file.path()).unwrap();

    assert_eq!(config.environment, Environment::Staging);
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.document.namespace_uri, "urn:example:returns");
    assert_eq!(config.services.target, ServicesTarget::Http);
    assert_eq!(config.services.request_timeout_seconds, 45);

    let http = config.services.http.unwrap();
    assert_eq!(http.api_token.unwrap().expose_secret(), "token-123");
    assert!(!http.tls_verify);

    assert_eq!(config.import.user_type, UserType::External);
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    let toml_content = r#"
[services]
target = "fixture"

[services.fixture]
path = "fixtures/services.toml"

[import]
user_email = "import@example.gov.uk"
entity_id = "entity-1"
"#;

    let temp_file = write_config(toml_content);
    let config = load_config(temp_file.path()).unwrap();

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.application.log_level, "info");
    assert_eq!(
        config.document.namespace_uri,
        "http://www.environment-agency.gov.uk/XMLSchemas/GOR/SAPMultiReturn/06"
    );
    assert_eq!(config.services.request_timeout_seconds, 30);
    assert_eq!(config.import.user_type, UserType::Internal);
    assert!(!config.logging.local_enabled);
    assert_eq!(config.logging.local_path, "/var/log/rill");
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_RILL_API_TOKEN", "secret-token");

    let toml_content = r#"
[services]
target = "http"

[services.http]
licences_url = "https://licences.example.gov.uk/api"
returns_url = "https://returns.example.gov.uk/api"
# api_token = "${TEST_RILL_COMMENTED_OUT}"
api_token = "${TEST_RILL_API_TOKEN}"

[import]
user_email = "import@example.gov.uk"
entity_id = "entity-1"
"#;

    let temp_file = write_config(toml_content);
    let config = load_config(temp_file.path()).unwrap();

    let token = config.services.http.unwrap().api_token.unwrap();
    assert_eq!(token.expose_secret(), "secret-token");

    cleanup_env_vars();
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("RILL_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("RILL_SERVICES_TARGET", "fixture");
    std::env::set_var("RILL_SERVICES_FIXTURE_PATH", "/srv/rill/fixtures.toml");
    std::env::set_var("RILL_SERVICES_REQUEST_TIMEOUT_SECONDS", "5");
    std::env::set_var("RILL_IMPORT_USER_TYPE", "external");

    let toml_content = r#"
[services]
target = "http"

[services.http]
licences_url = "https://licences.example.gov.uk/api"
returns_url = "https://returns.example.gov.uk/api"

[import]
user_email = "import@example.gov.uk"
entity_id = "entity-1"
"#;

    let temp_file = write_config(toml_content);
    let config = load_config(temp_file.path());
    cleanup_env_vars();
    let config = config.unwrap();

    assert_eq!(config.application.log_level, "trace");
    assert_eq!(config.services.target, ServicesTarget::Fixture);
    assert_eq!(
        config.services.fixture.unwrap().path,
        "/srv/rill/fixtures.toml"
    );
    assert_eq!(config.services.request_timeout_seconds, 5);
    assert_eq!(config.import.user_type, UserType::External);
}

#[test]
fn test_invalid_override_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("RILL_SERVICES_TARGET", "carrier-pigeon");

    let toml_content = r#"
[services]
target = "http"

[services.http]
licences_url = "https://licences.example.gov.uk/api"
returns_url = "https://returns.example.gov.uk/api"

[import]
user_email = "import@example.gov.uk"
entity_id = "entity-1"
"#;

    let temp_file = write_config(toml_content);
    let result = load_config(temp_file.path());
    cleanup_env_vars();

    assert!(result.unwrap_err().to_string().contains("carrier-pigeon"));
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    // Missing [services.http] for the http target
    let missing_section = r#"
[services]
target = "http"

[import]
user_email = "import@example.gov.uk"
entity_id = "entity-1"
"#;
    let temp_file = write_config(missing_section);
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("services.http"));

    // TLS verification cannot be disabled in production
    let insecure_production = r#"
environment = "production"

[services]
target = "http"

[services.http]
licences_url = "https://licences.example.gov.uk/api"
returns_url = "https://returns.example.gov.uk/api"
tls_verify = false

[import]
user_email = "import@example.gov.uk"
entity_id = "entity-1"
"#;
    let temp_file = write_config(insecure_production);
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("TLS"));

    // Empty namespace
    let empty_namespace = r#"
[document]
namespace_uri = ""

[services]
target = "fixture"

[services.fixture]
path = "fixtures.toml"

[import]
user_email = "import@example.gov.uk"
entity_id = "entity-1"
"#;
    let temp_file = write_config(empty_namespace);
    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("document.namespace_uri"));
}

#[test]
fn test_missing_env_var_reported() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let toml_content = r#"
[services]
target = "http"

[services.http]
licences_url = "${TEST_RILL_MISSING_LICENCES_URL}"
returns_url = "${TEST_RILL_MISSING_RETURNS_URL}"

[import]
user_email = "import@example.gov.uk"
entity_id = "entity-1"
"#;

    let temp_file = write_config(toml_content);
    let err = load_config(temp_file.path()).unwrap_err().to_string();
    assert!(err.contains("TEST_RILL_MISSING_LICENCES_URL"));
    assert!(err.contains("TEST_RILL_MISSING_RETURNS_URL"));
}
