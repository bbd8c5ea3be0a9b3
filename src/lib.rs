//! geoblock Library
//!
//! Country blocking for a site: an edge function that answers 451 for
//! requests from the blocked country, and a configuration API plus settings
//! page that store the blocked country code per site.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{blocked_country_integration, Integration};
pub use config::{load_config, load_config_from, Config};
pub use domain::entities::{GeoMetadata, SiteScope};
pub use domain::ports::{ConfigStore, ConfigStoreError, EnvLookup, GeoResolver};
pub use domain::services::{evaluate, filter_request, Decision};
pub use domain::value_objects::{PathPattern, BLOCKED_COUNTRY_CODE};
