//! GeoIP Resolver Port
//!
//! Defines the interface for resolving IP addresses to geographic metadata.

use crate::domain::entities::GeoMetadata;
use std::net::IpAddr;

/// Resolver for IP address to geographic metadata.
///
/// This is an outbound port that abstracts the GeoIP database.
/// Implementations may use MaxMind GeoLite2, IP2Location, or other databases.
pub trait GeoResolver: Send + Sync {
    /// Resolve an IP address to geographic metadata.
    ///
    /// Returns None if the IP cannot be resolved (private ranges,
    /// unknown networks, etc).
    fn resolve(&self, ip: IpAddr) -> Option<GeoMetadata>;
}
