//! Core business logic for Rill.
//!
//! This module contains the import pipeline that turns a multi-return
//! submission into canonical return records.
//!
//! # Modules
//!
//! - [`document`] - Namespace-aware navigation and permit/return extraction
//! - [`mapping`] - Classification, calendar rules, lines, meters and readings
//! - [`validation`] - The canonical return schema
//! - [`import`] - Import orchestration, outcome reporting and checksums
//!
//! # Import Workflow
//!
//! 1. **Parse**: Read the document and check its namespace
//! 2. **Extract**: Flatten permits into an ordered list of returns
//! 3. **Map**: Classify each return and derive its lines, meters and reading
//! 4. **Resolve**: Look up region codes for all licences in one call
//! 5. **Augment**: Fetch due dates for all return ids in one call
//! 6. **Validate**: Check each assembled record against the schema
//! 7. **Report**: Partition into accepted records and per-return failures
//!
//! # Example
//!
//! ```rust,no_run
//! use rill::adapters::create_services;
//! use rill::config::load_config;
//! use rill::core::import::{ImportContext, ReturnsImporter};
//! use rill::domain::UserType;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("rill.toml")?;
//! let (resolver, store) = create_services(&config).await?;
//!
//! let importer = ReturnsImporter::new(resolver, store);
//! let context = ImportContext::for_user("import@example.gov.uk", UserType::Internal, "entity-1");
//!
//! let xml = std::fs::read_to_string("submission.xml")?;
//! let outcome = importer.import_document(&xml, &context).await?;
//!
//! println!("Accepted: {}", outcome.records.len());
//! println!("Rejected: {}", outcome.failures.len());
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod import;
pub mod mapping;
pub mod validation;
