// Rill - Water Abstraction Returns Importer
// Copyright (c) 2025 Rill Contributors
// Licensed under the MIT License

//! # Rill - Water Abstraction Returns Importer
//!
//! Rill converts bulk water abstraction return submissions (XML, one document
//! per submission, many licences per document) into canonical return records
//! ready for storage.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Parsing** namespaced return documents into an immutable tree
//! - **Mapping** each return to a canonical record (dates, frequency, meters, lines)
//! - **Augmenting** records with region codes and due dates from two batched lookups
//! - **Validating** every record against the canonical return schema
//!
//! ## Architecture
//!
//! Rill follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (document, mapping, validation, import)
//! - [`adapters`] - Collaborators (licence and return services, fixtures)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rill::adapters::create_services;
//! use rill::config::load_config;
//! use rill::core::import::{ImportContext, ReturnsImporter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("rill.toml")?;
//!     let (resolver, store) = create_services(&config).await?;
//!
//!     let importer = ReturnsImporter::new(resolver, store)
//!         .with_namespaces(config.document.namespaces())
//!         .with_request_timeout(config.services.request_timeout());
//!
//!     let context = ImportContext::for_user(
//!         config.import.user_email.clone(),
//!         config.import.user_type,
//!         config.import.entity_id.clone(),
//!     );
//!
//!     let xml = std::fs::read_to_string("returns.xml")?;
//!     let outcome = importer.import_document(&xml, &context).await?;
//!
//!     println!(
//!         "Imported {} returns, rejected {}",
//!         outcome.records.len(),
//!         outcome.failures.len()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Rill uses the [`domain::RillError`] type for fatal errors. Problems with a
//! single return never abort an import; they are collected as
//! [`core::import::RecordFailure`]s next to the accepted records.
//!
//! ```rust,no_run
//! use rill::domain::RillError;
//!
//! fn example() -> Result<(), RillError> {
//!     let config = rill::config::load_config("rill.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Rill uses structured logging with the `tracing` crate. Every import runs
//! inside an `import` span carrying its import id.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
