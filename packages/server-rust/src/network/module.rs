//! Network module with deferred startup lifecycle.
//!
//! `new()` allocates shared state, `start()` binds the TCP listener, and
//! `serve()` accepts connections until the shutdown future resolves.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use fieldkit_core::ItemBackend;
use tokio::net::TcpListener;
use tracing::info;

use super::config::NetworkConfig;
use super::handlers::{
    filters_handler, health_handler, item_handler, liveness_handler, readiness_handler,
    where_handler, AppState,
};
use super::middleware::{build_http_layers, track_in_flight};
use super::shutdown::ShutdownController;
use crate::traits::SchemaProvider;

/// Owns the HTTP server lifecycle.
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    shutdown: Arc<ShutdownController>,
    schemas: Arc<dyn SchemaProvider>,
    backend: Option<Arc<dyn ItemBackend>>,
}

impl NetworkModule {
    /// Creates the module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, schemas: Arc<dyn SchemaProvider>) -> Self {
        Self {
            config,
            listener: None,
            shutdown: Arc::new(ShutdownController::new()),
            schemas,
            backend: None,
        }
    }

    /// Enables the item endpoints against `backend`.
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn ItemBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Assembles the router with all routes and middleware.
    ///
    /// Routes:
    /// - `GET /health`, `/health/live`, `/health/ready`
    /// - `GET /api/lists/{list}/where` -- URL filters to a `where` predicate
    /// - `GET /api/lists/{list}/filters` -- operator catalog
    /// - `GET /api/lists/{list}/items/{id}` -- item values and validation
    pub fn build_router(&self) -> Router {
        let state = AppState {
            shutdown: Arc::clone(&self.shutdown),
            config: Arc::new(self.config.clone()),
            start_time: Instant::now(),
            schemas: Arc::clone(&self.schemas),
            backend: self.backend.clone(),
        };

        Router::new()
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .route("/api/lists/{list}/where", get(where_handler))
            .route("/api/lists/{list}/filters", get(filters_handler))
            .route("/api/lists/{list}/items/{id}", get(item_handler))
            .layer(from_fn_with_state(Arc::clone(&self.shutdown), track_in_flight))
            .layer(build_http_layers(&self.config))
            .with_state(state)
    }

    /// Binds the listener and returns the bound port (OS-assigned for 0).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let port = listener.local_addr()?.port();

        info!(host = %self.config.host, port, "TCP listener bound");

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called or the server hits a
    /// fatal I/O error.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .take()
            .context("start() must be called before serve()")?;
        let router = self.build_router();
        let controller = Arc::clone(&self.shutdown);

        controller.set_ready();
        info!(
            lists = self.schemas.list_keys().len(),
            backend = self.backend.is_some(),
            "serving HTTP"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        controller.drain(self.config.drain_timeout).await;
        Ok(())
    }
}
