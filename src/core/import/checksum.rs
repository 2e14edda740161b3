//! Document checksums
//!
//! The SHA-256 of the raw document identifies a submission, so a re-import of
//! the same bytes can be recognised in audit logs.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of raw document bytes (64 characters)
///
/// # Examples
///
/// ```
/// use rill::core::import::checksum::document_checksum;
///
/// let checksum = document_checksum(b"<tns:GORSubmission/>");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn document_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    format!("{result:x}")
}
