//! Environment Lookup Port
//!
//! Read-only view of the variables an edge function sees at invocation time.

use async_trait::async_trait;

/// Environment-style lookup handed to edge functions.
///
/// Lookups never fail: a value that cannot be read is reported as absent.
#[async_trait]
pub trait EnvLookup: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
}
