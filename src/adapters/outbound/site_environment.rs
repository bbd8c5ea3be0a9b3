//! Site Environment
//!
//! EnvLookup over a ConfigStore, bound to the site the edge server fronts.

use crate::domain::entities::SiteScope;
use crate::domain::ports::{ConfigStore, EnvLookup};
use async_trait::async_trait;
use std::sync::Arc;

/// Environment variables of one site, read from the configuration store.
///
/// A store failure is logged and reported as an absent variable, which the
/// geo filter treats as "nothing configured".
#[derive(Clone)]
pub struct SiteEnvironment {
    store: Arc<dyn ConfigStore>,
    scope: SiteScope,
}

impl SiteEnvironment {
    pub fn new(store: Arc<dyn ConfigStore>, scope: SiteScope) -> Self {
        Self { store, scope }
    }

    pub fn scope(&self) -> &SiteScope {
        &self.scope
    }
}

#[async_trait]
impl EnvLookup for SiteEnvironment {
    async fn get(&self, key: &str) -> Option<String> {
        match self.store.get_variable(&self.scope, key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    "env lookup {} for {} failed, treating as unset: {}",
                    key,
                    self.scope,
                    e
                );
                None
            }
        }
    }
}
