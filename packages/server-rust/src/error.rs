//! Server error types.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fieldkit_core::FormError;
use serde_json::json;

/// Failures loading or registering list schemas.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read schema file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid schema document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("list {list} declares field {path} more than once")]
    DuplicateField { list: String, path: String },
    #[error("list {list} searches {path}, which is not a text field")]
    InvalidSearchField { list: String, path: String },
}

/// Errors returned by the HTTP API, rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unknown list: {0}")]
    UnknownList(String),
    #[error("no item backend is configured")]
    BackendUnavailable,
    #[error(transparent)]
    Form(#[from] FormError),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownList(_) => StatusCode::NOT_FOUND,
            Self::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Form(FormError::MissingItemId | FormError::UnknownField { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Self::Form(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
