//! Import outcome and reporting
//!
//! An import produces valid records and per-record failures side by side,
//! both in document order.

use crate::core::validation::Violation;
use crate::domain::{CanonicalReturn, ReturnId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Why a single return was left out of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// The licence has no region code
    UnresolvedLicence,
    /// The return id is not known to the record store, so it has no due date
    UnmatchedAugmentation,
    /// The assembled record failed the canonical schema
    SchemaViolation,
}

/// A return that did not make it into the output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFailure {
    pub kind: FailureKind,

    /// As written in the document
    pub licence_number: String,
    pub return_reference: String,

    /// Absent when no region code was available to build it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_id: Option<ReturnId>,

    pub message: String,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub violations: Vec<Violation>,
}

impl RecordFailure {
    /// Create a new record failure
    pub fn new(
        kind: FailureKind,
        licence_number: impl Into<String>,
        return_reference: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            licence_number: licence_number.into(),
            return_reference: return_reference.into(),
            return_id: None,
            message: message.into(),
            violations: Vec::new(),
        }
    }

    /// Attach the return id
    pub fn with_return_id(mut self, return_id: ReturnId) -> Self {
        self.return_id = Some(return_id);
        self
    }

    /// Attach schema violations
    pub fn with_violations(mut self, violations: Vec<Violation>) -> Self {
        self.violations = violations;
        self
    }
}

/// Result of importing one document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub import_id: Uuid,

    /// SHA-256 of the raw document
    pub document_checksum: String,

    /// Number of returns found in the document
    pub total_returns: usize,

    /// Number of distinct licences in the document
    pub total_licences: usize,

    /// Records that passed validation, in document order
    #[serde(rename = "returns")]
    pub records: Vec<CanonicalReturn>,

    /// Returns left out, in document order
    pub failures: Vec<RecordFailure>,

    #[serde(skip)]
    pub duration: Duration,
}

impl ImportOutcome {
    /// Create an empty outcome
    pub fn new(import_id: Uuid, document_checksum: String) -> Self {
        Self {
            import_id,
            document_checksum,
            total_returns: 0,
            total_licences: 0,
            records: Vec::new(),
            failures: Vec::new(),
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a per-return failure
    pub fn add_failure(&mut self, failure: RecordFailure) {
        tracing::warn!(
            kind = ?failure.kind,
            licence_number = %failure.licence_number,
            return_reference = %failure.return_reference,
            message = %failure.message,
            "Return rejected"
        );
        self.failures.push(failure);
    }

    /// Check if every return was accepted
    pub fn is_successful(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of failures of the given kind
    pub fn count_failures(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }

    /// Log the outcome
    pub fn log_summary(&self) {
        tracing::info!(
            import_id = %self.import_id,
            document_checksum = %self.document_checksum,
            total_returns = self.total_returns,
            total_licences = self.total_licences,
            accepted = self.records.len(),
            rejected = self.failures.len(),
            duration_ms = self.duration.as_millis() as u64,
            "Import completed"
        );

        if !self.failures.is_empty() {
            tracing::warn!(
                unresolved_licence = self.count_failures(FailureKind::UnresolvedLicence),
                unmatched_augmentation = self.count_failures(FailureKind::UnmatchedAugmentation),
                schema_violation = self.count_failures(FailureKind::SchemaViolation),
                "Import completed with rejected returns"
            );
        }
    }
}
