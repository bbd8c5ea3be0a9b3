//! Geo Filter - Domain Service
//!
//! Decides whether a request is served or blocked based on the country the
//! host resolved for it and the country code stored in the site's
//! configuration.
//!
//! ## Decision rules
//!
//! 1. No blocked code configured (absent or empty) -> allow
//! 2. No geo metadata, or no country code in it -> allow
//! 3. Country code equals the blocked code (exact, case-sensitive) -> block
//! 4. Anything else -> allow
//!
//! Missing data always fails open. The comparison performs no
//! normalization: `"us"` does not match `"US"`.

use crate::domain::entities::GeoMetadata;
use isocountry::CountryCode;
use std::future::Future;

/// HTTP 451 Unavailable For Legal Reasons.
pub const UNAVAILABLE_FOR_LEGAL_REASONS: u16 = 451;

/// Content type of the block page.
pub const BLOCK_CONTENT_TYPE: &str = "text/html";

/// Outcome of evaluating a request against the blocked country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Short-circuit with the given HTML message
    Block(String),
    /// Hand the request to the rest of the pipeline
    Allow,
}

impl Decision {
    pub fn is_block(&self) -> bool {
        matches!(self, Self::Block(_))
    }

    /// The response to send for a block decision.
    pub fn block_page(&self) -> Option<BlockPage> {
        match self {
            Self::Block(message) => Some(BlockPage::new(message.clone())),
            Self::Allow => None,
        }
    }
}

/// Fixed response produced for a blocked request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPage {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl BlockPage {
    pub fn new(body: String) -> Self {
        Self {
            status: UNAVAILABLE_FOR_LEGAL_REASONS,
            content_type: BLOCK_CONTENT_TYPE,
            body,
        }
    }
}

/// Result of running the filter with a downstream continuation.
#[derive(Debug)]
pub enum FilterOutcome<T> {
    /// The filter answered on its own
    Blocked(BlockPage),
    /// The downstream response, untouched
    Passed(T),
}

/// Evaluate a request's geo metadata against the blocked country code.
///
/// Total over its inputs: every combination of present and absent fields
/// yields a decision.
pub fn evaluate(geo: Option<&GeoMetadata>, blocked_code: Option<&str>) -> Decision {
    let blocked_code = match blocked_code {
        Some(code) if !code.is_empty() => code,
        _ => return Decision::Allow,
    };

    let Some(geo) = geo else {
        return Decision::Allow;
    };

    let Some(country_code) = geo.country_code.as_deref() else {
        return Decision::Allow;
    };

    if country_code != blocked_code {
        return Decision::Allow;
    }

    Decision::Block(block_message(geo, country_code))
}

/// Run the filter, invoking `next` only when the request is allowed.
///
/// `next` is consumed, so the downstream stage runs at most once. Its result
/// is returned as is; an error from it is not caught or rewritten here.
pub async fn filter_request<F, Fut, T, E>(
    geo: Option<&GeoMetadata>,
    blocked_code: Option<&str>,
    next: F,
) -> Result<FilterOutcome<T>, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match evaluate(geo, blocked_code) {
        Decision::Block(message) => Ok(FilterOutcome::Blocked(BlockPage::new(message))),
        Decision::Allow => next().await.map(FilterOutcome::Passed),
    }
}

fn block_message(geo: &GeoMetadata, country_code: &str) -> String {
    let name = geo
        .country_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .or_else(|| CountryCode::for_alpha2(country_code).ok().map(|c| c.name()))
        .unwrap_or(country_code);

    format!(
        "We're sorry, you can't access our content from {}!",
        escape_html(name)
    )
}

/// Escape text for interpolation into HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
