//! Collaborator traits
//!
//! The importer reaches the two external systems it depends on through these
//! traits. Both are batched: one call per document, never one per return.

use crate::domain::{LicenceNumber, RegionCode, Result, ReturnId};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A return already known to the record store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingReturn {
    pub return_id: ReturnId,

    /// Authoritative due date
    pub due_date: NaiveDate,

    /// Lifecycle status in the store (e.g. `due`, `received`)
    pub status: String,
}

/// Resolves licence numbers to the region that administers them
#[async_trait]
pub trait RegionResolver: Send + Sync {
    /// Resolve region codes for a batch of licence numbers
    ///
    /// Licences without a region are simply absent from the returned map.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup as a whole fails.
    async fn resolve_region_codes(
        &self,
        licence_numbers: &[LicenceNumber],
    ) -> Result<HashMap<LicenceNumber, RegionCode>>;
}

/// Looks up returns in the authoritative return record store
#[async_trait]
pub trait ReturnRecordStore: Send + Sync {
    /// Fetch the stored returns matching a batch of identifiers
    ///
    /// Unknown identifiers are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup as a whole fails.
    async fn fetch_existing_returns(&self, return_ids: &[ReturnId]) -> Result<Vec<ExistingReturn>>;
}
