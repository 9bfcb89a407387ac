use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::accessor::{FieldError, SafeAccessor};
use crate::fields::Payload;
use crate::selection::Selection;

/// Data plus sideband errors, as returned by every backend call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemResponse {
    /// The item, or `None` when the backend returned nothing.
    #[serde(default)]
    pub data: Option<Value>,
    /// Errors with paths relative to the item. An empty path applies to the
    /// whole request.
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

impl ItemResponse {
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// Errors that fail the whole request rather than one field.
    pub fn top_level_errors(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(|e| e.path.is_empty())
    }

    /// Wraps the item in an accessor. Field-level errors stay attached;
    /// top-level errors are dropped.
    #[must_use]
    pub fn into_accessor(self) -> SafeAccessor {
        let errors = self.errors.into_iter().filter(|e| !e.path.is_empty()).collect();
        SafeAccessor::new(self.data.unwrap_or(Value::Null), errors)
    }
}

/// Persistence backend for item editing.
///
/// Transport failures are `Err`; rejections the backend reports (access
/// denied, constraint violations) come back as [`ItemResponse::errors`].
#[async_trait]
pub trait ItemBackend: Send + Sync {
    /// Fetches one item with the given selections.
    async fn fetch_item(
        &self,
        list: &str,
        id: &str,
        selections: &[Selection],
    ) -> anyhow::Result<ItemResponse>;

    /// Creates an item from `payload` and returns it with `selections`.
    async fn create_item(
        &self,
        list: &str,
        payload: &Payload,
        selections: &[Selection],
    ) -> anyhow::Result<ItemResponse>;

    /// Applies a partial update and returns the updated item.
    async fn update_item(
        &self,
        list: &str,
        id: &str,
        payload: &Payload,
        selections: &[Selection],
    ) -> anyhow::Result<ItemResponse>;
}

/// Outcome tone of a user notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
}

/// A user-facing notification (toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub tone: Tone,
    pub title: String,
    pub message: Option<String>,
}

/// Receives notices raised by the form engine.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Logs notices through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        let message = notice.message.as_deref().unwrap_or("");
        match notice.tone {
            Tone::Positive => tracing::info!(title = %notice.title, message, "notice"),
            Tone::Negative => tracing::warn!(title = %notice.title, message, "notice"),
        }
    }
}
