//! REST API for dispatch runs and battery configuration.
//!
//! Routes:
//! - `POST /api/optimize`: generate market data and run a dispatch
//! - `GET /api/battery/status`: configured battery parameters and availability
//! - `POST /api/battery/configure`: update the stored battery defaults

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::sync::RwLock;

use crate::config::{BatteryConfig, RunConfig, SimulatorConfig};

/// Application state shared across all request handlers.
///
/// The battery configuration sits behind a lock so the configure endpoint
/// can update defaults, but every optimize run builds its own `Battery`
/// from a snapshot; no live battery is shared between runs.
pub struct AppState {
    /// Default battery parameters for new runs.
    pub battery: RwLock<BatteryConfig>,
    /// Default run parameters (horizon, interval, scenario, seed).
    pub run: RunConfig,
}

impl AppState {
    /// Creates the state from a validated simulator configuration.
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            battery: RwLock::new(config.battery),
            run: config.run,
        }
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/optimize", post(handlers::optimize))
        .route("/api/battery/status", get(handlers::battery_status))
        .route("/api/battery/configure", post(handlers::configure_battery))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
