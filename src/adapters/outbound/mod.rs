mod dashmap_config_store;
mod maxmind_geo_resolver;
mod origin_proxy;
mod site_environment;
mod sqlite_config_store;

pub use dashmap_config_store::DashMapConfigStore;
pub use maxmind_geo_resolver::MaxMindGeoResolver;
pub use origin_proxy::{OriginError, OriginProxy, DEFAULT_BODY_LIMIT};
pub use site_environment::SiteEnvironment;
pub use sqlite_config_store::SqliteConfigStore;
