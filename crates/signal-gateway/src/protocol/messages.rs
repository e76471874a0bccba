//! Message formats
//!
//! `ClientMessage` is validated on parse: an unknown `type` or a missing
//! required field is a parse error, and the session drops the frame without
//! closing the connection. Relay payloads (`offer`/`answer`/`candidate`)
//! capture their remaining fields untouched; the session forwards the
//! original text frame verbatim, so nothing is lost in re-serialization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use signal_core::{MemberInfo, PeerId, Role};

/// Messages accepted from clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Join a room, leaving the current one first if already joined.
    #[serde(rename_all = "camelCase")]
    Join {
        room: String,
        id: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        role: Option<Role>,
        #[serde(default)]
        is_mic_enabled: Option<bool>,
        #[serde(default)]
        is_broadcasting: Option<bool>,
    },
    /// Update mutable member status fields.
    #[serde(rename_all = "camelCase")]
    StatusUpdate {
        #[serde(default)]
        is_mic_enabled: Option<bool>,
        #[serde(default)]
        is_broadcasting: Option<bool>,
    },
    /// SDP offer, relayed without interpretation.
    Offer {
        #[serde(flatten)]
        fields: Map<String, Value>,
    },
    /// SDP answer, relayed without interpretation.
    Answer {
        #[serde(flatten)]
        fields: Map<String, Value>,
    },
    /// ICE candidate, relayed without interpretation.
    Candidate {
        #[serde(flatten)]
        fields: Map<String, Value>,
    },
    /// Explicit departure.
    Leave,
    /// Keep-alive; resets the idle timer and nothing else.
    Ping,
}

/// Extract a relay frame's target peer, accepting both the `target` and
/// `targetId` spellings. Absent target means room broadcast.
pub fn relay_target(fields: &Map<String, Value>) -> Option<PeerId> {
    fields
        .get("target")
        .or_else(|| fields.get("targetId"))
        .and_then(Value::as_str)
        .map(PeerId::from)
}

/// Messages pushed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Full ordered membership snapshot, sent to a peer on join.
    RosterUpdate { roster: Vec<MemberInfo> },
    /// Incremental notification: a peer entered the room.
    #[serde(rename_all = "camelCase")]
    UserJoined {
        id: PeerId,
        name: String,
        role: Role,
        is_mic_enabled: bool,
        is_broadcasting: bool,
    },
    /// Incremental notification: a peer left the room.
    UserLeft { id: PeerId },
    /// Incremental notification: a peer's status flags changed.
    #[serde(rename_all = "camelCase")]
    StatusUpdate {
        id: PeerId,
        is_mic_enabled: bool,
        is_broadcasting: bool,
    },
}

impl ServerMessage {
    #[must_use]
    pub fn roster(roster: Vec<MemberInfo>) -> Self {
        Self::RosterUpdate { roster }
    }

    #[must_use]
    pub fn user_joined(info: &MemberInfo) -> Self {
        Self::UserJoined {
            id: info.id.clone(),
            name: info.name.clone(),
            role: info.role,
            is_mic_enabled: info.is_mic_enabled,
            is_broadcasting: info.is_broadcasting,
        }
    }

    #[must_use]
    pub fn user_left(id: PeerId) -> Self {
        Self::UserLeft { id }
    }

    #[must_use]
    pub fn status(info: &MemberInfo) -> Self {
        Self::StatusUpdate {
            id: info.id.clone(),
            is_mic_enabled: info.is_mic_enabled,
            is_broadcasting: info.is_broadcasting,
        }
    }

    /// Serialize to a JSON text frame
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
