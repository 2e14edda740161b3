//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Rill using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Rill - water abstraction returns importer
#[derive(Parser, Debug)]
#[command(name = "rill")]
#[command(version, about, long_about = None)]
#[command(author = "Rill Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "rill.toml", env = "RILL_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RILL_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a returns XML document
    Import(commands::import::ImportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
