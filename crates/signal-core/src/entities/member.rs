//! Member entity
//!
//! One participant's state within a room: identity, role, status flags, and
//! the handle used to push frames back to it.

use crate::link::SharedLink;
use crate::value_objects::PeerId;
use serde::{Deserialize, Serialize};

/// Participant role within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Publishes audio to the room.
    Broadcaster,
    /// Consumes audio only.
    #[default]
    Listener,
    /// Dedicated receive-side endpoint.
    Receiver,
}

/// Profile supplied by a client at join time.
///
/// `name` and `role` are optional on the wire; the session fills in the
/// defaults before calling the registry.
#[derive(Debug, Clone)]
pub struct JoinProfile {
    pub id: PeerId,
    pub name: String,
    pub role: Role,
    pub mic_enabled: bool,
    pub broadcasting: bool,
}

/// Mutable status fields carried by a `status-update` message.
///
/// Absent fields leave the current value untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    pub mic_enabled: Option<bool>,
    pub broadcasting: Option<bool>,
}

/// One participant's state within a room.
///
/// Owned exclusively by the `Room` holding it; no other component retains a
/// `Member` after removal.
pub struct Member {
    pub id: PeerId,
    pub name: String,
    pub role: Role,
    pub mic_enabled: bool,
    pub broadcasting: bool,
    pub link: SharedLink,
}

impl Member {
    /// Create a member from a join profile and its connection handle.
    pub fn new(profile: JoinProfile, link: SharedLink) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            role: profile.role,
            mic_enabled: profile.mic_enabled,
            broadcasting: profile.broadcasting,
            link,
        }
    }

    /// Apply a status update to the mutable fields.
    pub fn apply(&mut self, update: StatusUpdate) {
        if let Some(mic_enabled) = update.mic_enabled {
            self.mic_enabled = mic_enabled;
        }
        if let Some(broadcasting) = update.broadcasting {
            self.broadcasting = broadcasting;
        }
    }

    /// Snapshot of this member for rosters and notifications.
    pub fn info(&self) -> MemberInfo {
        MemberInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            role: self.role,
            is_mic_enabled: self.mic_enabled,
            is_broadcasting: self.broadcasting,
        }
    }
}

impl std::fmt::Debug for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("role", &self.role)
            .field("mic_enabled", &self.mic_enabled)
            .field("broadcasting", &self.broadcasting)
            .finish()
    }
}

/// Serializable roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub id: PeerId,
    pub name: String,
    pub role: Role,
    pub is_mic_enabled: bool,
    pub is_broadcasting: bool,
}
