//! Configuration API Server
//!
//! Host bootstrap for the integration's API handlers. Every registered
//! handler is reachable at `/api/{name}`; the settings page is served at
//! `/settings`.

use crate::adapters::inbound::settings_page::{self, SettingsScope};
use crate::application::integration::{ApiContext, ApiRequest, ApiResponse, Integration};
use crate::domain::ports::ConfigStore;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Header carrying the site identifier.
pub const SITE_ID_HEADER: &str = "x-site-id";

/// Header carrying the account identifier.
pub const ACCOUNT_ID_HEADER: &str = "x-account-id";

/// Scope identifiers accepted as query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    pub site_id: Option<String>,
    pub account_id: Option<String>,
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub integration: String,
    pub api_handlers: usize,
}

/// API Server state.
#[derive(Clone)]
pub struct ApiState {
    pub integration: Arc<Integration>,
    pub store: Arc<dyn ConfigStore>,
}

impl ApiState {
    pub fn new(integration: Integration, store: Arc<dyn ConfigStore>) -> Self {
        Self {
            integration: Arc::new(integration),
            store,
        }
    }
}

/// Build the API router for an integration.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/:name", any(api_handler))
        .route("/settings", get(settings_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API Server for the configuration RPCs.
pub struct ApiServer {
    listen_addr: String,
    state: ApiState,
}

impl ApiServer {
    pub fn new(listen_addr: String, state: ApiState) -> Self {
        Self { listen_addr, state }
    }

    /// Get shared state for use by other components.
    pub fn state(&self) -> ApiState {
        self.state.clone()
    }

    /// Run the API server until `shutdown` completes.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run<F>(&self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(self.state.clone());

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!(
            "configuration API listening on {} (handlers: {:?})",
            self.listen_addr,
            self.state.integration.api_handler_names()
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        integration: state.integration.name().to_string(),
        api_handlers: state.integration.api_handler_names().len(),
    };
    Json(response)
}

async fn api_handler(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Query(query): Query<ScopeQuery>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(route) = state.integration.api_handler(&name) else {
        tracing::debug!("unknown API handler: {}", name);
        return (StatusCode::NOT_FOUND, format!("Unknown API handler: {}", name)).into_response();
    };

    if route.method != method {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, route.method.to_string())],
            format!("{} only accepts {}", name, route.method),
        )
            .into_response();
    }

    let ctx = ApiContext {
        store: state.store.clone(),
        account_id: scope_value(&headers, ACCOUNT_ID_HEADER, query.account_id),
        site_id: scope_value(&headers, SITE_ID_HEADER, query.site_id),
    };

    let body = if body.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&body).into_owned())
    };

    let response = route.handler.handle(ApiRequest::new(method, body), ctx).await;
    tracing::debug!("{} -> {}", name, response.status_code);
    into_http_response(response)
}

async fn settings_handler(
    State(state): State<ApiState>,
    Query(query): Query<ScopeQuery>,
) -> Html<String> {
    let scope = SettingsScope {
        account_id: query.account_id,
        site_id: query.site_id,
    };
    Html(settings_page::render(state.integration.name(), &scope))
}

/// Header value if present and non-empty, otherwise the query fallback.
fn scope_value(headers: &HeaderMap, name: &str, fallback: Option<String>) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or(fallback)
        .filter(|v| !v.is_empty())
}

fn into_http_response(response: ApiResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, response.content_type)],
        response.body,
    )
        .into_response()
}
