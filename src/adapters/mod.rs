//! External system integrations for Rill.
//!
//! An import depends on two collaborators:
//!
//! - [`RegionResolver`] - maps licence numbers to the region administering them
//! - [`ReturnRecordStore`] - reports due dates for returns already on record
//!
//! Two implementations are provided:
//!
//! - [`http`] - JSON over HTTP against the licence and return services
//! - [`fixture`] - a TOML file, for dry runs and local testing
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the importer can
//! be tested with in-memory implementations. [`create_services`] picks the
//! implementation from configuration:
//!
//! ```rust,no_run
//! use rill::adapters::create_services;
//! use rill::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("rill.toml")?;
//! let (resolver, store) = create_services(&config).await?;
//! # Ok(())
//! # }
//! ```

pub mod factory;
pub mod fixture;
pub mod http;
pub mod traits;

pub use factory::create_services;
pub use fixture::FixtureServices;
pub use http::HttpServices;
pub use traits::{ExistingReturn, RegionResolver, ReturnRecordStore};
