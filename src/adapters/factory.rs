//! Collaborator factory
//!
//! Builds the region resolver and return record store selected by
//! `[services] target`.

use super::fixture::FixtureServices;
use super::http::HttpServices;
use super::traits::{RegionResolver, ReturnRecordStore};
use crate::config::schema::{RillConfig, ServicesTarget};
use crate::domain::{Result, RillError};
use std::sync::Arc;

/// Create both collaborators from the same underlying client
///
/// # Errors
///
/// Returns an error if the selected section is missing or the client cannot
/// be created.
pub async fn create_services(
    config: &RillConfig,
) -> Result<(
    Arc<dyn RegionResolver + Send + Sync>,
    Arc<dyn ReturnRecordStore + Send + Sync>,
)> {
    match config.services.target {
        ServicesTarget::Http => {
            let http_config = config.services.http.as_ref().ok_or_else(|| {
                RillError::Configuration("[services.http] section is required".to_string())
            })?;

            tracing::info!(
                licences_url = %http_config.licences_url,
                returns_url = %http_config.returns_url,
                "Creating HTTP collaborators"
            );
            let services = Arc::new(HttpServices::new(
                http_config,
                config.services.request_timeout(),
            )?);

            Ok((
                services.clone() as Arc<dyn RegionResolver + Send + Sync>,
                services as Arc<dyn ReturnRecordStore + Send + Sync>,
            ))
        }
        ServicesTarget::Fixture => {
            let fixture_config = config.services.fixture.as_ref().ok_or_else(|| {
                RillError::Configuration("[services.fixture] section is required".to_string())
            })?;

            tracing::info!(path = %fixture_config.path, "Creating fixture collaborators");
            let path = fixture_config.path.clone();
            let services = tokio::task::spawn_blocking(move || FixtureServices::load(path))
                .await
                .map_err(|e| RillError::Other(format!("Fixture loading task failed: {e}")))??;
            let services = Arc::new(services);

            Ok((
                services.clone() as Arc<dyn RegionResolver + Send + Sync>,
                services as Arc<dyn ReturnRecordStore + Send + Sync>,
            ))
        }
    }
}
