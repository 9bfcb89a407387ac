//! In-memory schema registry loaded from a JSON document.
//!
//! ```json
//! { "lists": [ { "key": "Tool", "fields": [ ... ], "searchFields": ["name"] } ] }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use fieldkit_core::{FieldKind, ListSchema};
use serde::Deserialize;
use tracing::info;

use crate::error::SchemaError;
use crate::traits::SchemaProvider;

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    lists: Vec<ListSchema>,
}

/// Concurrent map of list key -> schema.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    lists: DashMap<String, Arc<ListSchema>>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] for malformed JSON and the validation
    /// errors of [`Self::insert`].
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let document: SchemaDocument = serde_json::from_str(text)?;
        let registry = Self::new();
        for list in document.lists {
            registry.insert(list)?;
        }
        Ok(registry)
    }

    /// Reads and parses a schema file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Read`] when the file cannot be read, otherwise
    /// as [`Self::from_json`].
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json(&text)?;
        info!(path = %path.display(), lists = registry.lists.len(), "schema loaded");
        Ok(registry)
    }

    /// Validates and stores a list schema.
    ///
    /// # Errors
    ///
    /// Rejects duplicate field paths and search fields that are not text.
    pub fn insert(&self, schema: ListSchema) -> Result<(), SchemaError> {
        validate(&schema)?;
        self.lists.insert(schema.key.clone(), Arc::new(schema));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, list: &str) -> Option<Arc<ListSchema>> {
        self.lists.get(list).map(|entry| Arc::clone(entry.value()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

fn validate(schema: &ListSchema) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in &schema.fields {
        if !seen.insert(field.path.as_str()) {
            return Err(SchemaError::DuplicateField {
                list: schema.key.clone(),
                path: field.path.clone(),
            });
        }
    }
    for path in &schema.search_fields {
        if schema.field(path).map(|f| f.kind()) != Some(FieldKind::Text) {
            return Err(SchemaError::InvalidSearchField {
                list: schema.key.clone(),
                path: path.clone(),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl SchemaProvider for SchemaRegistry {
    async fn get_schema(&self, list: &str) -> Option<Arc<ListSchema>> {
        self.get(list)
    }

    async fn register_schema(&self, schema: ListSchema) -> anyhow::Result<()> {
        self.insert(schema)?;
        Ok(())
    }

    fn list_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lists.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }
}
