//! Transport seam
//!
//! The registry never talks to a socket directly. Each member carries a
//! `PeerLink` handle; the gateway implements it on top of the connection's
//! outbound channel.

use crate::error::LinkError;
use std::sync::Arc;

/// One peer's outbound connection.
///
/// `try_send` must not block: a full or closed queue is reported to the
/// caller and never stalls delivery to other recipients of the same
/// broadcast.
pub trait PeerLink: Send + Sync {
    /// Queue a JSON text frame for delivery to the peer.
    fn try_send(&self, frame: String) -> Result<(), LinkError>;

    /// Whether the underlying connection is still open.
    fn is_open(&self) -> bool;
}

/// Shared handle to a peer's connection.
pub type SharedLink = Arc<dyn PeerLink>;
