//! Store trait abstraction for pluggable backends

use async_trait::async_trait;
use serde_json::Value;

use super::StoreError;

/// A path-addressed JSON store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read the value at `path`, `None` when nothing is stored there
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Overwrite the value at `path`, returning the store's acknowledgement
    async fn write(&self, path: &str, value: &Value) -> Result<Option<Value>, StoreError>;

    /// Remove the value at `path`
    async fn delete(&self, path: &str) -> Result<(), StoreError>;

    /// Human-readable name for this backend
    fn name(&self) -> &'static str;
}
