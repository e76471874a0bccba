//! Connection manager
//!
//! Tracks all active WebSocket connections using DashMap for thread-safe
//! access. The liveness monitor sweeps this table; sessions never look
//! each other up here (peer routing goes through the room registry).

use super::{Connection, Outbound};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Tracks all active WebSocket connections
pub struct ConnectionManager {
    connections: DashMap<String, Arc<Connection>>,
}

impl ConnectionManager {
    /// Create a new connection manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Create a new connection manager wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection
    pub fn add(&self, id: String, sender: mpsc::Sender<Outbound>) -> Arc<Connection> {
        let connection = Connection::new(id.clone(), sender);
        self.connections.insert(id.clone(), connection.clone());

        tracing::debug!(connection = %id, "connection added");

        connection
    }

    /// Remove a connection
    pub fn remove(&self, id: &str) {
        if self.connections.remove(id).is_some() {
            tracing::debug!(connection = %id, "connection removed");
        }
    }

    /// Get a connection by ID
    pub fn get(&self, id: &str) -> Option<Arc<Connection>> {
        self.connections.get(id).map(|r| r.clone())
    }

    /// Snapshot of every open connection, for the liveness sweep
    pub fn all(&self) -> Vec<Arc<Connection>> {
        self.connections.iter().map(|r| r.clone()).collect()
    }

    /// Get the total number of active connections
    pub fn count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .finish()
    }
}
