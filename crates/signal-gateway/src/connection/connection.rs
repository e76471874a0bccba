//! Individual WebSocket connection
//!
//! Wraps one transport-level connection: the outbound command channel
//! consumed by its send task, plus the liveness flag maintained between
//! probes. Implements `PeerLink` so the registry can hand frames back
//! without knowing about sockets.

use signal_core::{LinkError, PeerLink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Commands consumed by a connection's send task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A JSON text frame to deliver to the client.
    Frame(String),
    /// A WebSocket ping probe from the liveness monitor.
    Probe,
    /// Tear the connection down.
    Close,
}

/// A single WebSocket connection
pub struct Connection {
    /// Unique connection ID
    id: String,

    /// Channel to the send task
    sender: mpsc::Sender<Outbound>,

    /// Set on any inbound traffic, cleared by each liveness sweep
    alive: AtomicBool,

    /// Connection creation time
    created_at: Instant,
}

impl Connection {
    /// Create a new connection
    pub fn new(id: String, sender: mpsc::Sender<Outbound>) -> Arc<Self> {
        Arc::new(Self {
            id,
            sender,
            alive: AtomicBool::new(true),
            created_at: Instant::now(),
        })
    }

    /// Generate a unique connection ID
    #[must_use]
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Get the connection ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Record inbound traffic (frame, pong, or protocol ping).
    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::SeqCst);
    }

    /// Whether the connection answered since the previous probe. Clears the
    /// flag for the next round.
    pub fn take_alive(&self) -> bool {
        self.alive.swap(false, Ordering::SeqCst)
    }

    /// Queue a liveness probe. Returns false if the connection is gone or
    /// its queue is full.
    pub fn probe(&self) -> bool {
        self.sender.try_send(Outbound::Probe).is_ok()
    }

    /// Ask the send task to tear the connection down.
    pub fn request_close(&self) {
        let _ = self.sender.try_send(Outbound::Close);
    }

    /// Check if the send task is gone
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Get connection age
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }
}

impl PeerLink for Connection {
    fn try_send(&self, frame: String) -> Result<(), LinkError> {
        self.sender
            .try_send(Outbound::Frame(frame))
            .map_err(|e| match e {
                TrySendError::Full(_) => LinkError::Full,
                TrySendError::Closed(_) => LinkError::Closed,
            })
    }

    fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .finish()
    }
}
