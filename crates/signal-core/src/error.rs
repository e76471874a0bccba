//! Domain error types

use crate::value_objects::{PeerId, RoomId};
use thiserror::Error;

/// Routing failures for targeted relay.
///
/// All variants are non-fatal: the caller logs the outcome and drops the
/// message. Signaling layers above this engine retry or time out on their
/// own, so nothing is surfaced to the sender.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The named room does not exist.
    #[error("room '{0}' does not exist")]
    NoSuchRoom(RoomId),

    /// The target peer is not a member of the room.
    #[error("peer '{0}' is not in the room")]
    NoSuchTarget(PeerId),

    /// The target peer exists but its connection is no longer open.
    #[error("peer '{0}' has no open connection")]
    TargetUnreachable(PeerId),
}

/// Failure to hand a frame to a peer's outbound queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The connection has been closed.
    #[error("connection closed")]
    Closed,

    /// The outbound queue is full.
    #[error("outbound queue full")]
    Full,
}
