use std::sync::Arc;

use async_trait::async_trait;
use fieldkit_core::ListSchema;

/// Source of list schemas for the HTTP API.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Retrieve the schema for a list, if one has been registered.
    async fn get_schema(&self, list: &str) -> Option<Arc<ListSchema>>;

    /// Register a schema. Overwrites any existing schema with the same key.
    async fn register_schema(&self, schema: ListSchema) -> anyhow::Result<()>;

    /// Keys of every registered list, sorted.
    fn list_keys(&self) -> Vec<String>;
}
