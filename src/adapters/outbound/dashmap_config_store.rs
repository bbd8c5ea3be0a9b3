//! DashMap Config Store
//!
//! Implements ConfigStore in memory using DashMap for lock-free concurrent
//! access. Values are lost on restart.

use crate::domain::entities::SiteScope;
use crate::domain::ports::{ConfigStore, ConfigStoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// DashMap-backed configuration store.
///
/// Keyed by site scope; each site holds its own variable map.
pub struct DashMapConfigStore {
    variables: Arc<DashMap<SiteScope, DashMap<String, String>>>,
}

impl DashMapConfigStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self {
            variables: Arc::new(DashMap::new()),
        }
    }
}

impl Default for DashMapConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for DashMapConfigStore {
    async fn get_variable(
        &self,
        scope: &SiteScope,
        key: &str,
    ) -> Result<Option<String>, ConfigStoreError> {
        let Some(vars) = self.variables.get(scope) else {
            return Ok(None);
        };
        let value = vars.get(key).map(|v| v.value().clone());
        Ok(value)
    }

    async fn set_variable(
        &self,
        scope: &SiteScope,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigStoreError> {
        self.variables
            .entry(scope.clone())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
