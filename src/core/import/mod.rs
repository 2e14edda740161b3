//! Document import
//!
//! Orchestrates a whole import: mapping, the two batched collaborator calls,
//! record assembly and validation.

pub mod checksum;
pub mod context;
pub mod importer;
pub mod outcome;

pub use context::ImportContext;
pub use importer::{ReturnsImporter, DEFAULT_REQUEST_TIMEOUT};
pub use outcome::{FailureKind, ImportOutcome, RecordFailure};
