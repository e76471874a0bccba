//! Gateway state
//!
//! Application state for the gateway server.

use crate::connection::ConnectionManager;
use signal_common::AppConfig;
use signal_core::RoomRegistry;
use std::sync::Arc;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Room registry shared by every session
    registry: Arc<RoomRegistry>,
    /// Connection manager for WebSocket connections
    connections: Arc<ConnectionManager>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(
        registry: Arc<RoomRegistry>,
        connections: Arc<ConnectionManager>,
        config: AppConfig,
    ) -> Self {
        Self {
            registry,
            connections,
            config: Arc::new(config),
        }
    }

    /// Get the room registry
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Get the connection manager
    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connections", &self.connections)
            .field("rooms", &self.registry.room_count())
            .finish()
    }
}
