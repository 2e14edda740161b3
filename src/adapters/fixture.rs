//! Offline collaborators backed by a TOML fixture file
//!
//! Used for dry runs and local testing when the licence and return services
//! are not reachable. The file maps licence numbers to regions and lists the
//! returns the record store should report:
//!
//! ```toml
//! [regions]
//! "03/28/01/0001" = 3
//!
//! [[returns]]
//! return_id = "v1:3:03/28/01/0001:10012345:2019-04-01:2020-03-31"
//! due_date = "2020-04-28"
//! status = "due"
//! ```

use super::traits::{ExistingReturn, RegionResolver, ReturnRecordStore};
use crate::domain::{LicenceNumber, RegionCode, Result, ReturnId, RillError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

fn default_status() -> String {
    "due".to_string()
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    regions: BTreeMap<String, u8>,

    #[serde(default)]
    returns: Vec<FixtureReturn>,
}

#[derive(Debug, Deserialize)]
struct FixtureReturn {
    return_id: String,
    due_date: String,
    #[serde(default = "default_status")]
    status: String,
}

/// In-memory region map and return store loaded from a fixture file
#[derive(Debug, Clone, Default)]
pub struct FixtureServices {
    regions: HashMap<LicenceNumber, RegionCode>,
    returns: HashMap<ReturnId, ExistingReturn>,
}

impl FixtureServices {
    /// Load fixtures from a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`RillError::Configuration`] if the file cannot be read or
    /// contains invalid entries.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            RillError::Configuration(format!(
                "Failed to read fixture file {}: {e}",
                path.display()
            ))
        })?;

        let services = Self::from_toml(&contents)?;
        tracing::info!(
            path = %path.display(),
            regions = services.regions.len(),
            returns = services.returns.len(),
            "Loaded service fixtures"
        );
        Ok(services)
    }

    /// Parse fixtures from TOML text
    ///
    /// # Errors
    ///
    /// Returns [`RillError::Configuration`] on malformed TOML, unknown region
    /// codes, invalid return ids or unparseable due dates.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: FixtureFile = toml::from_str(contents)
            .map_err(|e| RillError::Configuration(format!("Invalid fixture file: {e}")))?;

        let mut services = Self::default();
        for (licence, code) in file.regions {
            let licence = LicenceNumber::new(licence).map_err(RillError::Configuration)?;
            let region = RegionCode::new(code).map_err(RillError::Configuration)?;
            services.regions.insert(licence, region);
        }

        for entry in file.returns {
            let return_id = ReturnId::parse(entry.return_id).map_err(RillError::Configuration)?;
            let due_date = NaiveDate::parse_from_str(&entry.due_date, "%Y-%m-%d").map_err(|e| {
                RillError::Configuration(format!(
                    "Invalid due date '{}' for {return_id}: {e}",
                    entry.due_date
                ))
            })?;
            services.returns.insert(
                return_id.clone(),
                ExistingReturn {
                    return_id,
                    due_date,
                    status: entry.status,
                },
            );
        }

        Ok(services)
    }

    /// Register a licence's region
    pub fn with_region(mut self, licence: LicenceNumber, region: RegionCode) -> Self {
        self.regions.insert(licence, region);
        self
    }

    /// Register an existing return
    pub fn with_return(mut self, existing: ExistingReturn) -> Self {
        self.returns.insert(existing.return_id.clone(), existing);
        self
    }
}

#[async_trait]
impl RegionResolver for FixtureServices {
    async fn resolve_region_codes(
        &self,
        licence_numbers: &[LicenceNumber],
    ) -> Result<HashMap<LicenceNumber, RegionCode>> {
        Ok(licence_numbers
            .iter()
            .filter_map(|l| self.regions.get(l).map(|r| (l.clone(), *r)))
            .collect())
    }
}

#[async_trait]
impl ReturnRecordStore for FixtureServices {
    async fn fetch_existing_returns(&self, return_ids: &[ReturnId]) -> Result<Vec<ExistingReturn>> {
        Ok(return_ids
            .iter()
            .filter_map(|id| self.returns.get(id).cloned())
            .collect())
    }
}
