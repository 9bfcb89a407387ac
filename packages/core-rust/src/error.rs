//! Error types for accessor navigation and form sessions.

/// Raised by [`SafeAccessor::get_or_throw`](crate::SafeAccessor::get_or_throw)
/// when a value the caller expected to be present is absent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("missing field: {path}")]
    MissingField {
        /// Dotted path of the field that could not be resolved.
        path: String,
    },
}

/// Errors surfaced by a [`FormEngine`](crate::FormEngine) session.
///
/// Stored in the engine's `error` slot as well as returned, so the variants
/// hold rendered messages rather than source errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("unknown field: {path}")]
    UnknownField { path: String },
    #[error("the item has no resolvable id")]
    MissingItemId,
    #[error("backend request failed: {message}")]
    Backend { message: String },
    #[error("backend rejected the change: {}", messages.join("; "))]
    Rejected { messages: Vec<String> },
}

impl FormError {
    pub(crate) fn backend(err: &anyhow::Error) -> Self {
        Self::Backend {
            message: format!("{err:#}"),
        }
    }
}
