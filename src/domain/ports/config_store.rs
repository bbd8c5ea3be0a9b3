//! Config Store Port
//!
//! Defines the interface for the per-site configuration store that holds
//! environment variables such as `BLOCKED_COUNTRY_CODE`.

use crate::domain::entities::SiteScope;
use async_trait::async_trait;

/// Errors raised by a configuration store.
///
/// The display text is surfaced verbatim by the configuration API.
#[derive(Debug, thiserror::Error)]
pub enum ConfigStoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("storage task failed: {0}")]
    Task(String),
}

/// Key-value store of environment variables, scoped per site.
///
/// Writes are last-write-wins; there is no history or versioning.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read a variable for a site.
    async fn get_variable(
        &self,
        scope: &SiteScope,
        key: &str,
    ) -> Result<Option<String>, ConfigStoreError>;

    /// Create or overwrite a variable for a site.
    async fn set_variable(
        &self,
        scope: &SiteScope,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigStoreError>;
}
