//! Health, liveness, and readiness endpoint handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::network::HealthState;

/// Detailed health as JSON.
///
/// Always 200; the `state` field tells "up but draining" apart from down.
pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let health = state.shutdown.health_state();
    let lists = state.schemas.list_keys().len();

    Json(json!({
        "state": health.as_str(),
        "lists": lists,
        "backend": state.backend.is_some(),
        "in_flight": state.shutdown.in_flight_count(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

/// Liveness probe: 200 while the process responds.
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe: 200 when ready, 503 while starting or draining.
pub async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    if state.shutdown.health_state() == HealthState::Ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use super::*;
    use crate::network::{NetworkConfig, ShutdownController};
    use crate::schema::tests::TOOLS;
    use crate::schema::SchemaRegistry;

    fn test_state() -> AppState {
        AppState {
            shutdown: Arc::new(ShutdownController::new()),
            config: Arc::new(NetworkConfig::default()),
            start_time: Instant::now(),
            schemas: Arc::new(SchemaRegistry::from_json(TOOLS).unwrap()),
            backend: None,
        }
    }

    #[tokio::test]
    async fn health_reports_state_and_lists() {
        let state = test_state();
        state.shutdown.set_ready();
        let _guard = state.shutdown.in_flight_guard();

        let json = health_handler(State(state)).await.0;
        assert_eq!(json["state"], "ready");
        assert_eq!(json["lists"], 1);
        assert_eq!(json["backend"], false);
        assert_eq!(json["in_flight"], 1);
        assert!(json["uptime_secs"].is_number());
    }

    #[tokio::test]
    async fn health_reports_draining() {
        let state = test_state();
        state.shutdown.trigger_shutdown();
        assert_eq!(health_handler(State(state)).await.0["state"], "draining");
    }

    #[tokio::test]
    async fn liveness_always_ok() {
        assert_eq!(liveness_handler().await, StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_follows_health_state() {
        let state = test_state();
        assert_eq!(
            readiness_handler(State(state.clone())).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        state.shutdown.set_ready();
        assert_eq!(readiness_handler(State(state.clone())).await, StatusCode::OK);
        state.shutdown.trigger_shutdown();
        assert_eq!(
            readiness_handler(State(state)).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
