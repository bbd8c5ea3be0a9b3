//! Blocked Country - the geo-blocking integration
//!
//! Two configuration RPCs that read and write `BLOCKED_COUNTRY_CODE` for a
//! site, and the `block_content` edge function that enforces it on every
//! request.

use crate::application::integration::{
    ApiContext, ApiHandler, ApiRequest, ApiResponse, EdgeContext, EdgeFunction, Integration,
};
use crate::domain::services::{filter_request, BlockPage, FilterOutcome};
use crate::domain::value_objects::{PathPattern, BLOCKED_COUNTRY_CODE};
use async_trait::async_trait;
use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, Method, StatusCode};
use axum::response::Response;

pub const INTEGRATION_NAME: &str = "geoblock";
pub const SAVE_HANDLER: &str = "save-blocked-country-code";
pub const GET_HANDLER: &str = "get-blocked-country-code";
pub const EDGE_FUNCTION_PREFIX: &str = "block_content";

const MISSING_PARAMETERS: &str = "Bad request: Missing required parameters";
const MISSING_CODE: &str = "Bad request: Missing BLOCKED_COUNTRY_CODE in body";
const SAVED: &str = "Variable successfully created or updated";
const NOT_FOUND: &str = "BLOCKED_COUNTRY_CODE not found";
const NULL_BODY: &str = "Cannot read BLOCKED_COUNTRY_CODE from a null body";

/// Build the integration: both RPCs plus the edge function on `/*`.
pub fn blocked_country_integration() -> Integration {
    Integration::new(INTEGRATION_NAME)
        .add_api_handler(SAVE_HANDLER, Method::POST, SaveBlockedCountryCode)
        .add_api_handler(GET_HANDLER, Method::GET, GetBlockedCountryCode)
        .add_edge_function(EDGE_FUNCTION_PREFIX, PathPattern::any(), BlockContent)
}

/// `POST save-blocked-country-code`
///
/// Body: `{"BLOCKED_COUNTRY_CODE": "<code>"}`.
pub struct SaveBlockedCountryCode;

#[async_trait]
impl ApiHandler for SaveBlockedCountryCode {
    async fn handle(&self, request: ApiRequest, ctx: ApiContext) -> ApiResponse {
        let body = request.body.filter(|b| !b.is_empty());
        let (Some(body), Some(scope)) = (body, ctx.scope()) else {
            return ApiResponse::text(400, MISSING_PARAMETERS);
        };

        let payload: serde_json::Value = match serde_json::from_str(&body) {
            Ok(value) => value,
            Err(e) => return ApiResponse::text(500, e.to_string()),
        };
        if payload.is_null() {
            return ApiResponse::text(500, NULL_BODY);
        }

        let code = payload
            .get(BLOCKED_COUNTRY_CODE)
            .and_then(serde_json::Value::as_str)
            .filter(|code| !code.is_empty());
        let Some(code) = code else {
            return ApiResponse::text(400, MISSING_CODE);
        };

        match ctx.store.set_variable(&scope, BLOCKED_COUNTRY_CODE, code).await {
            Ok(()) => {
                tracing::info!("blocked country for {} set to {}", scope, code);
                ApiResponse::text(200, SAVED)
            }
            Err(e) => {
                tracing::error!("failed to save blocked country for {}: {}", scope, e);
                ApiResponse::text(500, e.to_string())
            }
        }
    }
}

/// `GET get-blocked-country-code`
pub struct GetBlockedCountryCode;

#[async_trait]
impl ApiHandler for GetBlockedCountryCode {
    async fn handle(&self, _request: ApiRequest, ctx: ApiContext) -> ApiResponse {
        let Some(scope) = ctx.scope() else {
            return ApiResponse::text(400, MISSING_PARAMETERS);
        };

        match ctx.store.get_variable(&scope, BLOCKED_COUNTRY_CODE).await {
            Ok(Some(code)) if !code.is_empty() => ApiResponse::json(
                200,
                &serde_json::json!({ BLOCKED_COUNTRY_CODE: code }),
            ),
            Ok(_) => ApiResponse::text(404, NOT_FOUND),
            Err(e) => {
                tracing::error!("failed to read blocked country for {}: {}", scope, e);
                ApiResponse::text(500, e.to_string())
            }
        }
    }
}

/// Edge function enforcing the blocked country on every request.
pub struct BlockContent;

#[async_trait]
impl EdgeFunction for BlockContent {
    async fn call(&self, request: Request, ctx: EdgeContext) -> anyhow::Result<Response> {
        let EdgeContext { geo, env, next } = ctx;
        let blocked = env.get(BLOCKED_COUNTRY_CODE).await;

        let outcome =
            filter_request(geo.as_ref(), blocked.as_deref(), || next.run(request)).await?;

        match outcome {
            FilterOutcome::Blocked(page) => block_response(page),
            FilterOutcome::Passed(response) => Ok(response),
        }
    }
}

fn block_response(page: BlockPage) -> anyhow::Result<Response> {
    let response = Response::builder()
        .status(StatusCode::from_u16(page.status)?)
        .header(header::CONTENT_TYPE, page.content_type)
        .body(Body::from(page.body))?;
    Ok(response)
}
