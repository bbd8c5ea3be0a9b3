//! geoblock - country blocking in front of an origin
//!
//! This is the composition root that wires together all the components.

use geoblock::adapters::inbound::{ApiServer, ApiState, EdgeServer, EdgeState};
use geoblock::adapters::outbound::{
    DashMapConfigStore, MaxMindGeoResolver, OriginProxy, SiteEnvironment, SqliteConfigStore,
};
use geoblock::application::blocked_country_integration;
use geoblock::config::load_config;
use geoblock::domain::ports::{ConfigStore, GeoResolver};
use geoblock::infrastructure::{shutdown_signal, ShutdownController};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let scope = cfg.site_scope();
    tracing::info!(
        "starting geoblock site={} edge={} api={}",
        scope,
        cfg.edge_listen_addr,
        cfg.api_listen_addr
    );

    // ===== COMPOSITION ROOT =====

    // 1. Outbound adapters

    // Site variable store (SQLite when a path is given, DashMap otherwise)
    let store: Arc<dyn ConfigStore> = match &cfg.db_path {
        Some(path) => {
            tracing::info!("site variables stored in {}", path);
            Arc::new(SqliteConfigStore::open(path)?)
        }
        None => {
            tracing::warn!("GEOBLOCK_DB_PATH not set, site variables are kept in memory");
            Arc::new(DashMapConfigStore::new())
        }
    };

    // GeoIP resolver (MaxMind); without one every request is allowed
    let geo_resolver: Option<Arc<dyn GeoResolver>> = match &cfg.geoip_path {
        Some(path) => match MaxMindGeoResolver::from_file(path) {
            Ok(g) => {
                tracing::info!("GeoIP DB loaded from {}", path);
                Some(Arc::new(g) as Arc<dyn GeoResolver>)
            }
            Err(e) => {
                tracing::error!("failed to load GeoIP DB from {}: {:?}", path, e);
                None
            }
        },
        None => {
            tracing::warn!("GEOBLOCK_GEOIP_PATH not set, country blocking is inactive");
            None
        }
    };

    let origin = OriginProxy::new(&cfg.origin_url, Duration::from_secs(cfg.origin_timeout_secs))?
        .with_body_limit(cfg.max_body_bytes);
    let env = Arc::new(SiteEnvironment::new(store.clone(), scope));

    // 2. Integration
    let integration = blocked_country_integration();

    // 3. Inbound adapters
    let api_server = ApiServer::new(
        cfg.api_listen_addr.clone(),
        ApiState::new(integration.clone(), store),
    );
    let edge_server = EdgeServer::new(
        cfg.edge_listen_addr.clone(),
        EdgeState {
            integration: Arc::new(integration),
            geo_resolver,
            env,
            origin,
            trust_forwarded_for: cfg.trust_forwarded_for,
        },
    );

    let shutdown = ShutdownController::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    // The first server to fail stops the other
    tokio::try_join!(
        edge_server.run(shutdown.signalled()),
        api_server.run(shutdown.signalled()),
    )?;

    tracing::info!("geoblock stopped");
    Ok(())
}
