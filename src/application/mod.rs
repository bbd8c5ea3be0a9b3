//! Application Layer
//!
//! The integration's handler map and the blocked-country handlers
//! registered into it.

pub mod blocked_country;
pub mod integration;

pub use blocked_country::{
    blocked_country_integration, BlockContent, GetBlockedCountryCode, SaveBlockedCountryCode,
};
pub use integration::{
    ApiContext, ApiHandler, ApiRequest, ApiResponse, EdgeContext, EdgeFunction, Integration, Next,
};
