//! HTTP collaborators
//!
//! Talks to the licence service (region lookups) and the return record
//! service (due dates) with one JSON `POST` each:
//!
//! - `POST {licences_url}/regions` with `{"licenceNumbers": [...]}`
//! - `POST {returns_url}/search` with `{"returnIds": [...]}`
//!
//! Failed calls are not retried.

use super::traits::{ExistingReturn, RegionResolver, ReturnRecordStore};
use crate::config::{HttpServicesConfig, SecretString};
use crate::domain::{LicenceNumber, RegionCode, Result, ReturnId, RillError, ServiceError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

const REGIONS_PATH: &str = "regions";
const SEARCH_PATH: &str = "search";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegionsRequest<'a> {
    licence_numbers: &'a [LicenceNumber],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionRow {
    licence_number: String,
    region_code: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    return_ids: &'a [ReturnId],
}

/// Licence and return services over HTTP
pub struct HttpServices {
    client: Client,
    licences_url: String,
    returns_url: String,
    api_token: Option<SecretString>,
}

impl HttpServices {
    /// Create a client for the configured services
    ///
    /// # Errors
    ///
    /// Returns [`RillError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: &HttpServicesConfig, timeout: Duration) -> Result<Self> {
        let mut client_builder = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(timeout);

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification is disabled for collaborator services");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| RillError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            licences_url: config.licences_url.trim_end_matches('/').to_string(),
            returns_url: config.returns_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(url).json(body);
        if let Some(ref token) = self.api_token {
            let token: &str = token.expose_secret().as_ref();
            request = request.bearer_auth(token);
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ServiceError::Timeout(format!("{url}: {e}"))
            } else {
                ServiceError::ConnectionFailed(format!("{url}: {e}"))
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            let error = if status.is_server_error() {
                ServiceError::ServerError {
                    status: status.as_u16(),
                    message,
                }
            } else {
                ServiceError::ClientError {
                    status: status.as_u16(),
                    message,
                }
            };
            return Err(error.into());
        }

        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::InvalidResponse(format!("{url}: {e}")).into())
    }
}

#[async_trait]
impl RegionResolver for HttpServices {
    async fn resolve_region_codes(
        &self,
        licence_numbers: &[LicenceNumber],
    ) -> Result<HashMap<LicenceNumber, RegionCode>> {
        let url = format!("{}/{REGIONS_PATH}", self.licences_url);
        let rows: Vec<RegionRow> = self
            .post_json(&url, &RegionsRequest { licence_numbers })
            .await?;

        let mut regions = HashMap::with_capacity(rows.len());
        for row in rows {
            let Some(code) = row.region_code else {
                continue;
            };
            // An unusable row leaves its licence unresolved
            let parsed = LicenceNumber::new(row.licence_number.as_str()).and_then(|licence| {
                u8::try_from(code)
                    .map_err(|_| format!("Region code must be between 1 and 8, got: {code}"))
                    .and_then(RegionCode::new)
                    .map(|region| (licence, region))
            });
            match parsed {
                Ok((licence, region)) => {
                    regions.insert(licence, region);
                }
                Err(e) => tracing::warn!(
                    licence_number = %row.licence_number,
                    error = %e,
                    "Ignoring unusable region code row"
                ),
            }
        }

        tracing::debug!(
            requested = licence_numbers.len(),
            resolved = regions.len(),
            "Resolved region codes"
        );
        Ok(regions)
    }
}

#[async_trait]
impl ReturnRecordStore for HttpServices {
    async fn fetch_existing_returns(&self, return_ids: &[ReturnId]) -> Result<Vec<ExistingReturn>> {
        let url = format!("{}/{SEARCH_PATH}", self.returns_url);
        let existing: Vec<ExistingReturn> =
            self.post_json(&url, &SearchRequest { return_ids }).await?;

        tracing::debug!(
            requested = return_ids.len(),
            found = existing.len(),
            "Fetched existing returns"
        );
        Ok(existing)
    }
}
