//! Gateway server setup
//!
//! Provides the main WebSocket server configuration and routes.

mod handler;
mod state;

pub use handler::signaling_handler;
pub use state::GatewayState;

use crate::connection::ConnectionManager;
use crate::liveness::LivenessMonitor;
use axum::{routing::get, Router};
use signal_common::{AppConfig, AppError};
use signal_core::RoomRegistry;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/ws", get(signaling_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies and create `GatewayState`
///
/// Also spawns the liveness monitor over the new connection table.
pub fn create_gateway_state(config: AppConfig) -> GatewayState {
    let registry = RoomRegistry::new_shared();
    let connections = ConnectionManager::new_shared();

    LivenessMonitor::new(connections.clone(), config.heartbeat.interval()).spawn();

    GatewayState::new(registry, connections, config)
}

/// Serve the application on an already-bound listener
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    axum::serve(listener, app).await.map_err(AppError::Server)?;

    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.address();

    let state = create_gateway_state(config);
    let app = create_app(state);

    let listener = TcpListener::bind(&addr).await.map_err(|e| AppError::Bind {
        addr: addr.clone(),
        source: e,
    })?;

    tracing::info!("Gateway listening on ws://{}/ws", addr);

    serve(listener, app).await
}
