//! Import command implementation
//!
//! This module implements the `import` command, which converts one returns
//! XML document into canonical return records.

use super::exit_code;
use crate::adapters::create_services;
use crate::config::{load_config, RillConfig};
use crate::core::import::{ImportContext, ImportOutcome, ReturnsImporter};
use crate::domain::{RillError, UserType};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::io::Write;
use std::path::Path;

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the returns XML document
    pub file: String,

    /// Write the outcome JSON to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Date the document was received (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub received_date: Option<String>,

    /// Override the submitting user's email
    #[arg(long)]
    pub user_email: Option<String>,

    /// Override the submitting user's type (internal or external)
    #[arg(long)]
    pub user_type: Option<String>,

    /// Override the submitting user's entity id
    #[arg(long)]
    pub entity_id: Option<String>,
}

impl ImportArgs {
    /// Execute the import command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(file = %self.file, "Starting import command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Configuration error: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let context = match self.build_context(&config) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Invalid import options");
                eprintln!("Invalid import options: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let xml = match read_document(&self.file).await {
            Ok(xml) => xml,
            Err(e @ RillError::Parse(_)) => {
                eprintln!("❌ {e}");
                return Ok(exit_code::PARSE);
            }
            Err(e) => {
                tracing::error!(error = %e, file = %self.file, "Failed to read document");
                eprintln!("❌ Failed to read {}: {e}", self.file);
                return Ok(exit_code::FATAL);
            }
        };

        let (resolver, store) = match create_services(&config).await {
            Ok(services) => services,
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to create collaborators");
                eprintln!("Failed to initialize services: {e}");
                return Ok(match e {
                    RillError::Configuration(_) => exit_code::CONFIGURATION,
                    _ => exit_code::COLLABORATOR,
                });
            }
        };

        let importer = ReturnsImporter::new(resolver, store)
            .with_namespaces(config.document.namespaces())
            .with_request_timeout(config.services.request_timeout());

        eprintln!("🚀 Importing {}...", self.file);

        let outcome = match importer.import_document(&xml, &context).await {
            Ok(outcome) => outcome,
            Err(e) => {
                crate::log_error_with_context!(&e, "Import failed");
                eprintln!("❌ Import failed: {e}");
                return Ok(exit_code_for_error(&e));
            }
        };

        self.write_outcome(&outcome)?;
        print_summary(&outcome);

        Ok(if outcome.is_successful() {
            eprintln!("✅ Import completed successfully!");
            exit_code::SUCCESS
        } else {
            eprintln!("⚠️  Import completed with rejected returns");
            exit_code::RECORD_FAILURES
        })
    }

    /// Combine configured user details with command-line overrides
    fn build_context(&self, config: &RillConfig) -> Result<ImportContext, String> {
        let user_type: UserType = match &self.user_type {
            Some(value) => value.parse()?,
            None => config.import.user_type,
        };
        let user_email = self
            .user_email
            .clone()
            .unwrap_or_else(|| config.import.user_email.clone());
        if !user_email.contains('@') {
            return Err(format!("user email must be an email address, got '{user_email}'"));
        }
        let entity_id = self
            .entity_id
            .clone()
            .unwrap_or_else(|| config.import.entity_id.clone());

        let received_date = match &self.received_date {
            Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map_err(|e| format!("invalid received date '{value}': {e}"))?,
            None => Local::now().date_naive(),
        };

        Ok(ImportContext::for_user(user_email, user_type, entity_id)
            .with_received_date(received_date))
    }

    fn write_outcome(&self, outcome: &ImportOutcome) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(outcome)?;
        match &self.output {
            Some(path) => {
                std::fs::write(path, json)?;
                tracing::info!(path = %path, "Wrote import outcome");
            }
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{json}")?;
            }
        }
        Ok(())
    }
}

async fn read_document(path: impl AsRef<Path>) -> crate::domain::Result<String> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    String::from_utf8(bytes)
        .map_err(|e| RillError::Parse(format!("Document is not valid UTF-8: {e}")))
}

/// Map a fatal import error to the process exit code
pub fn exit_code_for_error(error: &RillError) -> i32 {
    match error {
        RillError::Configuration(_) => exit_code::CONFIGURATION,
        RillError::Parse(_) => exit_code::PARSE,
        RillError::Service(_) => exit_code::COLLABORATOR,
        _ => exit_code::FATAL,
    }
}

fn print_summary(outcome: &ImportOutcome) {
    eprintln!();
    eprintln!("📊 Import Summary:");
    eprintln!("  Import ID: {}", outcome.import_id);
    eprintln!("  Document Checksum: {}", outcome.document_checksum);
    eprintln!("  Licences: {}", outcome.total_licences);
    eprintln!("  Returns: {}", outcome.total_returns);
    eprintln!("  Imported: {}", outcome.records.len());
    eprintln!("  Rejected: {}", outcome.failures.len());
    eprintln!("  Duration: {:.2}s", outcome.duration.as_secs_f64());
    eprintln!();

    if !outcome.failures.is_empty() {
        eprintln!("⚠️  Rejected returns:");
        for (i, failure) in outcome.failures.iter().enumerate() {
            if i < 10 {
                eprintln!(
                    "  - {} / {} ({:?}): {}",
                    failure.licence_number, failure.return_reference, failure.kind, failure.message
                );
            }
        }
        if outcome.failures.len() > 10 {
            eprintln!("  ... and {} more", outcome.failures.len() - 10);
        }
        eprintln!();
    }
}
