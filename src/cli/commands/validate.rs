//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Rill configuration file.

use super::exit_code;
use crate::config::load_config;
use crate::config::schema::{RillConfig, ServicesTarget};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading runs substitution, overrides and validation
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(exit_code::CONFIGURATION);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        for line in summary_lines(&config) {
            println!("{line}");
        }
        println!();
        Ok(exit_code::SUCCESS)
    }
}

fn summary_lines(config: &RillConfig) -> Vec<String> {
    let mut lines = vec![
        "Configuration Summary:".to_string(),
        format!("  Environment: {:?}", config.environment),
        format!("  Log Level: {}", config.application.log_level),
        format!("  Namespace: {}", config.document.namespace_uri),
        format!(
            "  Request Timeout: {}s",
            config.services.request_timeout_seconds
        ),
    ];

    match config.services.target {
        ServicesTarget::Http => {
            if let Some(ref http) = config.services.http {
                lines.push("  Services: HTTP".to_string());
                lines.push(format!("  Licence Service: {}", http.licences_url));
                lines.push(format!("  Return Service: {}", http.returns_url));
                lines.push(format!(
                    "  API Token: {}",
                    if http.api_token.is_some() { "set" } else { "not set" }
                ));
                lines.push(format!("  TLS Verify: {}", http.tls_verify));
            }
        }
        ServicesTarget::Fixture => {
            if let Some(ref fixture) = config.services.fixture {
                lines.push("  Services: Fixture".to_string());
                lines.push(format!("  Fixture File: {}", fixture.path));
            }
        }
    }

    lines.push(format!(
        "  Import User: {} ({:?}, entity {})",
        config.import.user_email, config.import.user_type, config.import.entity_id
    ));
    lines.push(format!(
        "  File Logging: {}",
        if config.logging.local_enabled {
            format!(
                "{} ({})",
                config.logging.local_path, config.logging.local_rotation
            )
        } else {
            "disabled".to_string()
        }
    ));
    lines
}
