//! Per-connection session state machine
//!
//! A session binds one connection to at most one (room, peer) pair and
//! interprets inbound frames against the room registry. It never holds a
//! room reference, only identifiers re-resolved on each operation, so a
//! room torn down and recreated underneath never leaks stale state.

use crate::connection::Connection;
use crate::protocol::{relay_target, ClientMessage, ServerMessage};
use serde_json::{Map, Value};
use signal_core::{
    JoinProfile, PeerId, PeerLink, RoomId, RoomRegistry, SharedLink, StatusUpdate,
};
use std::sync::Arc;

/// Fallback display name when a join omits one.
const ANONYMOUS_NAME: &str = "Anonymous";

/// Where a connection currently stands in the room protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, not in any room.
    Unjoined,
    /// Bound to one room under one peer id.
    Joined { room: RoomId, peer: PeerId },
    /// Left for good; only a new join revives the connection.
    Closed,
}

/// Per-connection protocol state machine.
pub struct Session {
    connection: Arc<Connection>,
    registry: Arc<RoomRegistry>,
    state: SessionState,
}

impl Session {
    pub fn new(connection: Arc<Connection>, registry: Arc<RoomRegistry>) -> Self {
        Self {
            connection,
            registry,
            state: SessionState::Unjoined,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Handle one inbound text frame.
    ///
    /// A malformed or unknown frame is logged and dropped; a single bad
    /// message never terminates the session.
    pub fn handle_frame(&mut self, text: &str) {
        // Any inbound traffic proves the connection is alive.
        self.connection.mark_alive();

        let message = match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => message,
            Err(error) => {
                tracing::debug!(
                    connection = %self.connection.id(),
                    %error,
                    "dropping malformed frame"
                );
                return;
            }
        };

        match message {
            ClientMessage::Join {
                room,
                id,
                name,
                role,
                is_mic_enabled,
                is_broadcasting,
            } => {
                let profile = JoinProfile {
                    id: PeerId::from(id),
                    name: name.unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
                    role: role.unwrap_or_default(),
                    mic_enabled: is_mic_enabled.unwrap_or(false),
                    broadcasting: is_broadcasting.unwrap_or(false),
                };
                self.handle_join(RoomId::from(room), profile);
            }
            ClientMessage::StatusUpdate {
                is_mic_enabled,
                is_broadcasting,
            } => {
                self.handle_status(StatusUpdate {
                    mic_enabled: is_mic_enabled,
                    broadcasting: is_broadcasting,
                });
            }
            ClientMessage::Offer { fields }
            | ClientMessage::Answer { fields }
            | ClientMessage::Candidate { fields } => {
                self.handle_relay(&fields, text);
            }
            ClientMessage::Leave => {
                self.leave_current();
                self.state = SessionState::Closed;
            }
            // Alive flag already refreshed above; nothing else to do.
            ClientMessage::Ping => {}
        }
    }

    /// Transport-close path: leave the room and park the session. Idempotent.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.leave_current();
        self.state = SessionState::Closed;
    }

    fn handle_join(&mut self, room_id: RoomId, profile: JoinProfile) {
        // A join while joined is a room switch: leave the old binding first.
        if matches!(self.state, SessionState::Joined { .. }) {
            self.leave_current();
        }

        let peer_id = profile.id.clone();
        let link: SharedLink = self.connection.clone();
        // Delivery happens inside the registry call, under the room lock.
        let outcome = self.registry.join(room_id.clone(), profile, link, |outcome| {
            self.send_to_self(&ServerMessage::roster(outcome.roster.clone()));
            Self::fan_out(&outcome.peers, &ServerMessage::user_joined(&outcome.joined));
        });

        tracing::info!(
            room = %room_id,
            peer = %peer_id,
            replaced = outcome.replaced,
            "peer joined"
        );

        self.state = SessionState::Joined {
            room: room_id,
            peer: peer_id,
        };
    }

    fn handle_status(&mut self, update: StatusUpdate) {
        let SessionState::Joined { room, peer } = &self.state else {
            tracing::debug!(
                connection = %self.connection.id(),
                "ignoring status update before join"
            );
            return;
        };

        let delivered = self.registry.update_status(room, peer, update, |outcome| {
            Self::fan_out(&outcome.peers, &ServerMessage::status(&outcome.updated));
        });
        if delivered.is_none() {
            // Late update after disconnect; nothing to do.
            tracing::trace!(room = %room, peer = %peer, "status update for absent member");
        }
    }

    fn handle_relay(&mut self, fields: &Map<String, Value>, raw: &str) {
        let SessionState::Joined { room, peer } = &self.state else {
            tracing::debug!(
                connection = %self.connection.id(),
                "dropping relay frame before join"
            );
            return;
        };

        if let Some(target) = relay_target(fields) {
            // Non-fatal: log and drop, never retried.
            if let Err(error) = self.registry.relay_targeted(room, peer, &target, raw) {
                tracing::debug!(room = %room, sender = %peer, %error, "relay dropped");
            }
        } else {
            // No target named: mesh-compatibility broadcast.
            let recipients = self.registry.relay_broadcast(room, peer, raw);
            tracing::trace!(room = %room, sender = %peer, recipients, "broadcast relayed");
        }
    }

    fn leave_current(&mut self) {
        let SessionState::Joined { room, peer } = &self.state else {
            return;
        };

        // The link identifies this connection: if a reconnect overwrote the
        // membership entry, this leave is stale and must not touch it.
        let link: SharedLink = self.connection.clone();
        let outcome = self.registry.leave(room, peer, &link, |outcome| {
            Self::fan_out(
                &outcome.peers,
                &ServerMessage::user_left(outcome.removed.id.clone()),
            );
        });
        if outcome.is_some() {
            tracing::info!(room = %room, peer = %peer, "peer left");
        }
    }

    fn send_to_self(&self, message: &ServerMessage) {
        let Ok(frame) = message.to_json() else {
            return;
        };
        if let Err(error) = self.connection.try_send(frame) {
            tracing::warn!(connection = %self.connection.id(), %error, "send to self failed");
        }
    }

    /// Deliver one message to a set of peers. A failed send to one
    /// recipient never affects delivery to the others.
    fn fan_out(peers: &[(PeerId, SharedLink)], message: &ServerMessage) {
        let Ok(frame) = message.to_json() else {
            return;
        };
        for (peer, link) in peers {
            if let Err(error) = link.try_send(frame.clone()) {
                tracing::trace!(peer = %peer, %error, "dropping notification");
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("connection", &self.connection.id())
            .field("state", &self.state)
            .finish()
    }
}
