//! Validation report structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single failed constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted path of the offending field, e.g. `lines[0].timePeriod`
    pub field: String,

    /// What the field should have satisfied
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Result of validating one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Violated constraints, in the order they were checked
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Create an empty (passing) report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violated constraint
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(field, message));
    }

    /// Check if the record passed
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// One-line description of all violations
    pub fn format_summary(&self) -> String {
        if self.is_valid() {
            return "valid".to_string();
        }
        self.violations
            .iter()
            .map(Violation::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
