//! Origin Proxy
//!
//! The last stage of the edge pipeline: forwards an allowed request to the
//! origin server and hands its response back unchanged.

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use bytes::BytesMut;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use std::time::Duration;

/// Default cap on buffered request and response bodies (10 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("origin request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("could not forward request: {0}")]
    InvalidRequest(String),
    #[error("request body exceeds {0} bytes")]
    RequestTooLarge(usize),
    #[error("origin response body exceeds {0} bytes")]
    ResponseTooLarge(usize),
    #[error("invalid origin response: {0}")]
    InvalidResponse(String),
}

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Reverse proxy to a single origin.
#[derive(Clone)]
pub struct OriginProxy {
    client: reqwest::Client,
    origin: String,
    body_limit: usize,
}

impl OriginProxy {
    /// Create a proxy for `origin_url` (scheme + host + optional port).
    pub fn new(origin_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            origin: origin_url.trim_end_matches('/').to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
        })
    }

    /// Cap request and response bodies at `limit` bytes.
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    /// Forward a request to the origin and return its response.
    pub async fn forward(&self, request: Request) -> Result<Response, OriginError> {
        let (parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = format!("{}{}", self.origin, path_and_query);

        let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes())
            .map_err(|e| OriginError::InvalidRequest(e.to_string()))?;

        let body = Limited::new(body, self.body_limit)
            .collect()
            .await
            .map_err(|e| {
                if e.is::<LengthLimitError>() {
                    OriginError::RequestTooLarge(self.body_limit)
                } else {
                    OriginError::InvalidRequest(e.to_string())
                }
            })?
            .to_bytes();

        let mut outbound = self.client.request(method, &url);
        for (name, value) in parts.headers.iter() {
            if is_hop_by_hop(name.as_str()) || *name == header::HOST {
                continue;
            }
            outbound = outbound.header(name.as_str(), value.as_bytes());
        }

        tracing::debug!("forwarding {} {}", parts.method, url);
        let mut upstream = outbound.body(body).send().await?;

        let status = StatusCode::from_u16(upstream.status().as_u16())
            .map_err(|e| OriginError::InvalidResponse(e.to_string()))?;

        let mut builder = Response::builder().status(status);
        for (name, value) in upstream.headers().iter() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            match (
                HeaderName::from_bytes(name.as_str().as_bytes()),
                HeaderValue::from_bytes(value.as_bytes()),
            ) {
                (Ok(name), Ok(value)) => builder = builder.header(name, value),
                _ => tracing::debug!("dropping unrepresentable header {}", name.as_str()),
            }
        }

        let mut bytes = BytesMut::new();
        while let Some(chunk) = upstream.chunk().await? {
            if bytes.len() + chunk.len() > self.body_limit {
                return Err(OriginError::ResponseTooLarge(self.body_limit));
            }
            bytes.extend_from_slice(&chunk);
        }

        builder
            .body(Body::from(bytes.freeze()))
            .map_err(|e| OriginError::InvalidResponse(e.to_string()))
    }
}
