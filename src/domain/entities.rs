//! Domain Entities - Core business objects
//!
//! These entities represent the inputs of the geo-blocking domain.
//! They have no external dependencies and contain only business logic.

use serde::{Deserialize, Serialize};

/// Geographic metadata attached to a request by the host.
///
/// Produced by a [`GeoResolver`](crate::domain::ports::GeoResolver) before
/// the edge function runs. The filter only ever reads it. Either field may
/// be missing when the resolver knows the country but not its name, or the
/// other way round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoMetadata {
    /// Country code as reported by the resolver (usually ISO 3166-1 alpha-2)
    pub country_code: Option<String>,
    /// Human readable country name
    pub country_name: Option<String>,
}

impl GeoMetadata {
    pub fn new(country_code: impl Into<String>, country_name: impl Into<String>) -> Self {
        Self {
            country_code: Some(country_code.into()),
            country_name: Some(country_name.into()),
        }
    }

    /// Metadata that only carries a country code.
    pub fn from_code(country_code: impl Into<String>) -> Self {
        Self {
            country_code: Some(country_code.into()),
            country_name: None,
        }
    }
}

/// Identifies the site whose configuration is being read or written.
///
/// Every configuration variable lives under an (account, site) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteScope {
    /// Account (team) that owns the site
    pub account_id: String,
    /// Site identifier within the account
    pub site_id: String,
}

impl SiteScope {
    pub fn new(account_id: impl Into<String>, site_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            site_id: site_id.into(),
        }
    }

    /// Build a scope from optional identifiers.
    ///
    /// Returns None when either identifier is missing or empty.
    pub fn from_parts(account_id: Option<&str>, site_id: Option<&str>) -> Option<Self> {
        match (account_id, site_id) {
            (Some(account), Some(site)) if !account.is_empty() && !site.is_empty() => {
                Some(Self::new(account, site))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for SiteScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.account_id, self.site_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // ===== GeoMetadata Tests =====

    #[test]
    fn test_geo_metadata_new() {
        let geo = GeoMetadata::new("FR", "France");
        assert_eq!(geo.country_code.as_deref(), Some("FR"));
        assert_eq!(geo.country_name.as_deref(), Some("France"));
    }

    #[test]
    fn test_geo_metadata_from_code_has_no_name() {
        let geo = GeoMetadata::from_code("DE");
        assert_eq!(geo.country_code.as_deref(), Some("DE"));
        assert!(geo.country_name.is_none());
    }

    #[test]
    fn test_geo_metadata_default_is_empty() {
        let geo = GeoMetadata::default();
        assert!(geo.country_code.is_none());
        assert!(geo.country_name.is_none());
    }

    // ===== SiteScope Tests =====

    #[test]
    fn test_site_scope_from_parts() {
        let scope = SiteScope::from_parts(Some("team-1"), Some("site-1")).unwrap();
        assert_eq!(scope.account_id, "team-1");
        assert_eq!(scope.site_id, "site-1");
    }

    #[test]
    fn test_site_scope_from_parts_missing() {
        assert!(SiteScope::from_parts(None, Some("site-1")).is_none());
        assert!(SiteScope::from_parts(Some("team-1"), None).is_none());
        assert!(SiteScope::from_parts(None, None).is_none());
    }

    #[test]
    fn test_site_scope_from_parts_empty_counts_as_missing() {
        assert!(SiteScope::from_parts(Some(""), Some("site-1")).is_none());
        assert!(SiteScope::from_parts(Some("team-1"), Some("")).is_none());
    }

    #[test]
    fn test_site_scope_hash_distinguishes_sites() {
        let mut set = HashSet::new();
        set.insert(SiteScope::new("team-1", "site-1"));
        set.insert(SiteScope::new("team-1", "site-2"));
        set.insert(SiteScope::new("team-1", "site-1"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_site_scope_display() {
        let scope = SiteScope::new("team-1", "site-1");
        assert_eq!(scope.to_string(), "team-1/site-1");
    }
}
