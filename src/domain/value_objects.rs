//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::{Deserialize, Serialize};

/// Configuration key holding the blocked country code.
pub const BLOCKED_COUNTRY_CODE: &str = "BLOCKED_COUNTRY_CODE";

/// URL path pattern an edge function is registered against.
///
/// A pattern ending in `/*` matches the prefix itself and every path below
/// it, so `/*` matches everything. Any other pattern matches exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathPattern(String);

impl PathPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    /// Pattern matching every path.
    pub fn any() -> Self {
        Self::new("/*")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether a request path falls under this pattern.
    ///
    /// # Examples
    /// ```
    /// use geoblock::domain::value_objects::PathPattern;
    ///
    /// assert!(PathPattern::new("/*").matches("/anything/at/all"));
    /// assert!(PathPattern::new("/blog/*").matches("/blog/post-1"));
    /// assert!(!PathPattern::new("/blog/*").matches("/blogroll"));
    /// ```
    pub fn matches(&self, path: &str) -> bool {
        match self.0.strip_suffix("/*") {
            Some(prefix) => {
                if prefix.is_empty() {
                    return true;
                }
                match path.strip_prefix(prefix) {
                    Some(rest) => rest.is_empty() || rest.starts_with('/'),
                    None => false,
                }
            }
            None => self.0 == path,
        }
    }
}

impl Default for PathPattern {
    fn default() -> Self {
        Self::any()
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
