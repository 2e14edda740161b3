//! Record validation against the canonical return schema

pub mod report;
pub mod schema;

pub use report::{ValidationReport, Violation};
pub use schema::{CanonicalReturnSchema, ReturnValidator};
