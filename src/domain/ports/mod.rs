mod config_store;
mod env_lookup;
mod geo_resolver;

pub use config_store::{ConfigStore, ConfigStoreError};
pub use env_lookup::EnvLookup;
pub use geo_resolver::GeoResolver;
