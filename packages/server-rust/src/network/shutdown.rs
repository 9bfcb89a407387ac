//! Graceful shutdown with health state and in-flight request tracking.
//!
//! Health transitions are lock-free (`ArcSwap`); in-flight requests are
//! counted by RAII guards so the drain phase can wait for them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::watch;
use tracing::{info, warn};

/// Server health: Starting -> Ready -> Draining -> Stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Starting,
    Ready,
    Draining,
    Stopped,
}

impl HealthState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

/// Coordinates readiness, shutdown signalling and the drain phase.
#[derive(Debug)]
pub struct ShutdownController {
    signal: watch::Sender<bool>,
    in_flight: Arc<AtomicU64>,
    state: ArcSwap<HealthState>,
}

impl ShutdownController {
    /// Creates a controller in the `Starting` state.
    #[must_use]
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            signal,
            in_flight: Arc::new(AtomicU64::new(0)),
            state: ArcSwap::from_pointee(HealthState::Starting),
        }
    }

    pub fn set_ready(&self) {
        self.state.store(Arc::new(HealthState::Ready));
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.state.load()
    }

    /// A receiver that flips to `true` once shutdown begins.
    #[must_use]
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.signal.subscribe()
    }

    /// Moves to `Draining` and signals every receiver.
    pub fn trigger_shutdown(&self) {
        self.state.store(Arc::new(HealthState::Draining));
        // Receivers may all be gone.
        let _ = self.signal.send(true);
    }

    /// Counts a request as in flight until the guard is dropped.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Waits up to `timeout` for in-flight requests to finish.
    ///
    /// Moves to `Stopped` and returns `true` once none remain; returns
    /// `false` (still `Draining`) when the timeout expires first.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.in_flight_count() == 0 {
                self.state.store(Arc::new(HealthState::Stopped));
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Full drain sequence run after the listener stops accepting.
    pub async fn drain(&self, timeout: Duration) {
        self.trigger_shutdown();
        let pending = self.in_flight_count();
        if pending > 0 {
            info!(pending, "waiting for in-flight requests");
        }
        if self.wait_for_drain(timeout).await {
            info!("shutdown complete");
        } else {
            warn!(remaining = self.in_flight_count(), "drain timeout expired");
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter on drop, including during unwinding.
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}
