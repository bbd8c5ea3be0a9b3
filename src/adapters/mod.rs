//! Adapters Layer
//!
//! Inbound adapters expose the integration over HTTP; outbound adapters
//! implement the domain ports.

pub mod inbound;
pub mod outbound;
