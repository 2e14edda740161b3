//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod import;
pub mod init;
pub mod validate;

/// Process exit codes shared by the commands
pub mod exit_code {
    /// Every return was imported
    pub const SUCCESS: i32 = 0;
    /// Import completed but some returns were rejected
    pub const RECORD_FAILURES: i32 = 1;
    pub const CONFIGURATION: i32 = 2;
    /// Document could not be parsed
    pub const PARSE: i32 = 3;
    /// Region resolver or return store failed
    pub const COLLABORATOR: i32 = 4;
    pub const FATAL: i32 = 5;
}
