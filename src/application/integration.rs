//! Integration - handler registration
//!
//! An [`Integration`] is a plain handler map: named API handlers for the
//! configuration RPCs and path-scoped edge functions for request-time
//! filtering. The host bootstrap functions in `adapters::inbound` turn it
//! into HTTP routers; nothing in here knows how requests arrive.

use crate::domain::entities::{GeoMetadata, SiteScope};
use crate::domain::ports::{ConfigStore, EnvLookup};
use crate::domain::value_objects::PathPattern;
use async_trait::async_trait;
use axum::extract::Request;
use axum::http::Method;
use axum::response::Response;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Content type of plain text API responses.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Content type of JSON API responses.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Request handed to an API handler.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Raw request body, None when the request carried no body
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, body: Option<String>) -> Self {
        Self { method, body }
    }
}

/// Per-invocation context provided by the host.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Arc<dyn ConfigStore>,
    pub account_id: Option<String>,
    pub site_id: Option<String>,
}

impl ApiContext {
    /// The site the call is scoped to, if both identifiers were resolved.
    pub fn scope(&self) -> Option<SiteScope> {
        SiteScope::from_parts(self.account_id.as_deref(), self.site_id.as_deref())
    }
}

/// Response returned by an API handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status_code: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl ApiResponse {
    pub fn text(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            content_type: TEXT_CONTENT_TYPE,
            body: body.into(),
        }
    }

    pub fn json(status_code: u16, value: &serde_json::Value) -> Self {
        Self {
            status_code,
            content_type: JSON_CONTENT_TYPE,
            body: value.to_string(),
        }
    }
}

/// A named RPC registered with the integration.
#[async_trait]
pub trait ApiHandler: Send + Sync {
    async fn handle(&self, request: ApiRequest, ctx: ApiContext) -> ApiResponse;
}

/// Future produced by the downstream pipeline.
pub type PipelineFuture = Pin<Box<dyn Future<Output = anyhow::Result<Response>> + Send>>;

/// Continuation that runs the rest of the request pipeline.
///
/// `run` takes `self`, so the downstream stage can be invoked at most once.
pub struct Next {
    inner: Box<dyn FnOnce(Request) -> PipelineFuture + Send>,
}

impl Next {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Request) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Response>> + Send + 'static,
    {
        Self {
            inner: Box::new(move |req| Box::pin(f(req))),
        }
    }

    pub async fn run(self, request: Request) -> anyhow::Result<Response> {
        (self.inner)(request).await
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Next")
    }
}

/// What an edge function sees besides the request itself.
pub struct EdgeContext {
    /// Geo metadata resolved by the host, if any
    pub geo: Option<GeoMetadata>,
    /// Site environment variables
    pub env: Arc<dyn EnvLookup>,
    /// Rest of the pipeline
    pub next: Next,
}

/// Request-time function registered against a path pattern.
///
/// An error is a failure of the downstream pipeline; the host decides how
/// to report it.
#[async_trait]
pub trait EdgeFunction: Send + Sync {
    async fn call(&self, request: Request, ctx: EdgeContext) -> anyhow::Result<Response>;
}

/// Registered API handler with the method it answers to.
#[derive(Clone)]
pub struct ApiRoute {
    pub method: Method,
    pub handler: Arc<dyn ApiHandler>,
}

/// Registered edge function.
#[derive(Clone)]
pub struct EdgeRoute {
    pub prefix: String,
    pub path: PathPattern,
    pub function: Arc<dyn EdgeFunction>,
}

/// Handler map passed to the host bootstrap functions.
#[derive(Clone, Default)]
pub struct Integration {
    name: String,
    api_handlers: HashMap<String, ApiRoute>,
    edge_functions: Vec<EdgeRoute>,
}

impl Integration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            api_handlers: HashMap::new(),
            edge_functions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an API handler under `name`. A later registration with the
    /// same name replaces the earlier one.
    pub fn add_api_handler<H>(
        mut self,
        name: impl Into<String>,
        method: Method,
        handler: H,
    ) -> Self
    where
        H: ApiHandler + 'static,
    {
        let name = name.into();
        if self.api_handlers.contains_key(&name) {
            tracing::warn!("replacing API handler {}", name);
        }
        self.api_handlers.insert(
            name,
            ApiRoute {
                method,
                handler: Arc::new(handler),
            },
        );
        self
    }

    /// Register an edge function for every path matching `path`.
    pub fn add_edge_function<F>(
        mut self,
        prefix: impl Into<String>,
        path: PathPattern,
        function: F,
    ) -> Self
    where
        F: EdgeFunction + 'static,
    {
        self.edge_functions.push(EdgeRoute {
            prefix: prefix.into(),
            path,
            function: Arc::new(function),
        });
        self
    }

    pub fn api_handler(&self, name: &str) -> Option<&ApiRoute> {
        self.api_handlers.get(name)
    }

    /// Registered handler names, sorted.
    pub fn api_handler_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.api_handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// First edge function registered for a path, in registration order.
    pub fn edge_function_for(&self, path: &str) -> Option<&EdgeRoute> {
        self.edge_functions.iter().find(|route| route.path.matches(path))
    }

    pub fn edge_functions(&self) -> &[EdgeRoute] {
        &self.edge_functions
    }
}

impl std::fmt::Debug for Integration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integration")
            .field("name", &self.name)
            .field("api_handlers", &self.api_handler_names())
            .field(
                "edge_functions",
                &self
                    .edge_functions
                    .iter()
                    .map(|r| (r.prefix.as_str(), r.path.as_str()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
