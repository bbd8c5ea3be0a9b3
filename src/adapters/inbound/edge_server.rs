//! Edge Server
//!
//! Fronts the origin. Every request is matched against the integration's
//! edge functions; a matching function runs with the client's geo metadata
//! and the site environment, and the origin proxy as its continuation.
//! Requests no function claims go straight to the origin.

use crate::adapters::outbound::{OriginError, OriginProxy};
use crate::application::integration::{EdgeContext, Integration, Next};
use crate::domain::entities::GeoMetadata;
use crate::domain::ports::{EnvLookup, GeoResolver};
use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Header a trusted load balancer uses to pass the client address.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Edge Server state.
#[derive(Clone)]
pub struct EdgeState {
    pub integration: Arc<Integration>,
    pub geo_resolver: Option<Arc<dyn GeoResolver>>,
    pub env: Arc<dyn EnvLookup>,
    pub origin: OriginProxy,
    /// Take the client address from `X-Forwarded-For` instead of the peer
    pub trust_forwarded_for: bool,
}

/// Build the edge router. All paths fall through to the edge handler.
pub fn router(state: EdgeState) -> Router {
    Router::new()
        .fallback(edge_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Edge Server - inbound adapter for site traffic.
pub struct EdgeServer {
    listen_addr: String,
    state: EdgeState,
}

impl EdgeServer {
    pub fn new(listen_addr: String, state: EdgeState) -> Self {
        Self { listen_addr, state }
    }

    pub fn state(&self) -> EdgeState {
        self.state.clone()
    }

    /// Run the edge server until `shutdown` completes.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run<F>(&self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(self.state.clone());

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!(
            "edge server listening on {} (origin: {}, geoip: {})",
            self.listen_addr,
            self.state.origin.origin(),
            if self.state.geo_resolver.is_some() { "on" } else { "off" }
        );

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;
        Ok(())
    }
}

async fn edge_handler(State(state): State<EdgeState>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    let origin = state.origin.clone();

    let Some(route) = state.integration.edge_function_for(&path) else {
        return match origin.forward(request).await {
            Ok(response) => response,
            Err(e) => origin_failure(&path, &anyhow::Error::from(e)),
        };
    };

    let geo = resolve_geo(&state, &request);
    tracing::debug!(
        "{} {} -> {} (country: {:?})",
        request.method(),
        path,
        route.prefix,
        geo.as_ref().and_then(|g| g.country_code.as_deref())
    );

    let ctx = EdgeContext {
        geo,
        env: state.env.clone(),
        next: Next::new(move |req| async move {
            origin.forward(req).await.map_err(anyhow::Error::from)
        }),
    };

    match route.function.call(request, ctx).await {
        Ok(response) => response,
        Err(e) => origin_failure(&path, &e),
    }
}

fn resolve_geo(state: &EdgeState, request: &Request) -> Option<GeoMetadata> {
    let resolver = state.geo_resolver.as_ref()?;
    let ip = client_ip(request, state.trust_forwarded_for)?;
    resolver.resolve(ip)
}

/// Client address of a request.
///
/// With `trust_forwarded_for` the first parseable `X-Forwarded-For` entry
/// wins; otherwise, or when the header is absent, the peer address.
pub fn client_ip(request: &Request, trust_forwarded_for: bool) -> Option<IpAddr> {
    if trust_forwarded_for {
        let forwarded = request
            .headers()
            .get(FORWARDED_FOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

/// 413 for an oversized request body, 502 for any other origin failure.
fn origin_failure(path: &str, error: &anyhow::Error) -> Response {
    if let Some(OriginError::RequestTooLarge(_)) = error.downcast_ref::<OriginError>() {
        tracing::warn!("rejected request for {}: {}", path, error);
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("Payload Too Large: {}", error),
        )
            .into_response();
    }

    tracing::error!("origin request for {} failed: {:#}", path, error);
    (StatusCode::BAD_GATEWAY, format!("Bad Gateway: {}", error)).into_response()
}
