//! Axum handlers and the shared [`AppState`] they extract.

pub mod health;
pub mod lists;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use lists::{filters_handler, item_handler, where_handler};

use std::sync::Arc;
use std::time::Instant;

use fieldkit_core::ItemBackend;

use super::{NetworkConfig, ShutdownController};
use crate::traits::SchemaProvider;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Graceful shutdown controller with health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    pub config: Arc<NetworkConfig>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
    /// Registered list schemas.
    pub schemas: Arc<dyn SchemaProvider>,
    /// Item store; `None` when the server only translates filters.
    pub backend: Option<Arc<dyn ItemBackend>>,
}
