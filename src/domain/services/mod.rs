pub mod geo_filter;

pub use geo_filter::{escape_html, evaluate, filter_request, BlockPage, Decision, FilterOutcome};
