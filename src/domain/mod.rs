//! Domain models and types for Rill.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`LicenceNumber`], [`ReturnReference`], [`RegionCode`], [`ReturnId`])
//! - **The canonical return model** ([`CanonicalReturn`] and its parts)
//! - **Error types** ([`RillError`], [`ServiceError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! Identifiers are newtypes validated on construction, so a [`ReturnId`] can
//! only be assembled from parts that already satisfy its format:
//!
//! ```rust
//! use rill::domain::{LicenceNumber, RegionCode, ReturnId, ReturnReference};
//! use chrono::NaiveDate;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let id = ReturnId::build(
//!     RegionCode::new(4)?,
//!     &LicenceNumber::new("03/28/01/0001")?,
//!     &ReturnReference::new("10012345")?,
//!     NaiveDate::from_ymd_opt(2019, 4, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2020, 3, 31).unwrap(),
//! );
//! assert!(id.as_str().starts_with("v1:4:"));
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod result;
pub mod returns;

// Re-export commonly used types for convenience
pub use errors::{RillError, ServiceError};
pub use ids::{LicenceNumber, RegionCode, ReturnId, ReturnReference};
pub use result::Result;
pub use returns::{
    CanonicalReturn, Frequency, Meter, Reading, ReadingType, ReturnLine, ReturnUser, Units,
    UserType,
};
