//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::exit_code;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "rill.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Rill configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit_code::CONFIGURATION);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set services.target to 'http' or 'fixture'");
                println!("  3. Set RILL_SERVICES_API_TOKEN in your environment or a .env file");
                println!("  4. Validate configuration: rill validate-config");
                println!("  5. Run an import: rill import returns.xml");
                println!();
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(exit_code::FATAL)
            }
        }
    }

    /// Generate the sample configuration
    fn generate_config() -> String {
        r#"# Rill Configuration File
# Water abstraction returns importer

# Runtime environment (development, staging, production)
environment = "development"

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

[document]
# Namespace of the bulk returns schema, bound to the tns prefix
namespace_uri = "http://www.environment-agency.gov.uk/XMLSchemas/GOR/SAPMultiReturn/06"

[services]
# Collaborator implementation: http | fixture
target = "http"

# Bound on each batched call, in seconds (1-600)
request_timeout_seconds = 30

[services.http]
licences_url = "https://licences.example.gov.uk/api"
returns_url = "https://returns.example.gov.uk/api"
api_token = "${RILL_SERVICES_API_TOKEN}"
tls_verify = true

# Offline collaborators for dry runs (services.target = "fixture")
# [services.fixture]
# path = "fixtures/services.toml"

[import]
# User recorded on every imported return
user_email = "import@example.gov.uk"
user_type = "internal"  # internal | external
entity_id = "00000000-0000-0000-0000-000000000000"

[logging]
# JSON file logging in addition to the console
local_enabled = false
local_path = "/var/log/rill"
local_rotation = "daily"  # daily | hourly | never
"#
        .to_string()
    }
}
