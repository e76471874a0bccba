//! Room registry
//!
//! The sole shared mutable resource of the engine: a concurrent map from
//! room id to room. Rooms are created lazily on first join and removed the
//! moment they empty. Every mutating operation runs synchronously under the
//! map's per-entry lock, so operations on one room serialize while distinct
//! rooms proceed in parallel, and no lock is ever held across an await
//! point.
//!
//! Membership operations take a delivery callback invoked before the room's
//! entry lock is released. Delivery is a non-blocking `try_send` per
//! recipient, so holding the lock is safe, and every member observes the
//! room's events in one total order. The callback must not call back into
//! the registry: the entry lock is still held.

use crate::entities::{JoinProfile, Member, MemberInfo, Room, StatusUpdate};
use crate::error::RelayError;
use crate::link::{PeerLink, SharedLink};
use crate::value_objects::{PeerId, RoomId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Result of a join: data for the caller to deliver.
#[derive(Clone)]
pub struct JoinOutcome {
    /// Full ordered roster, to be sent to the joining connection.
    pub roster: Vec<MemberInfo>,
    /// Snapshot of the member that just joined.
    pub joined: MemberInfo,
    /// The other members, to receive an incremental joined notification.
    pub peers: Vec<(PeerId, SharedLink)>,
    /// An existing member with the same id was overwritten (reconnect).
    pub replaced: bool,
    /// The room did not exist before this join.
    pub created_room: bool,
}

/// Result of a status update.
#[derive(Clone)]
pub struct StatusOutcome {
    /// The member's state after the update.
    pub updated: MemberInfo,
    /// The other members, to be notified of the change.
    pub peers: Vec<(PeerId, SharedLink)>,
}

/// Result of a leave.
#[derive(Clone)]
pub struct LeaveOutcome {
    /// Snapshot of the member that was removed.
    pub removed: MemberInfo,
    /// The room emptied and was torn down. For logging only; the `peers`
    /// list is empty in that case.
    pub room_closed: bool,
    /// The remaining members, to be notified of the departure.
    pub peers: Vec<(PeerId, SharedLink)>,
}

/// Mapping from room identifier to room membership.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Room>,
}

impl RoomRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Create a new registry wrapped in Arc.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Admit a peer into a room, creating the room on first join.
    ///
    /// A join with a peer id already present overwrites the existing member
    /// in place (last-join-wins) and fabricates no leave notification for
    /// the overwritten entry.
    ///
    /// `deliver` runs while the room's entry lock is held and must not call
    /// back into the registry.
    pub fn join<F>(
        &self,
        room_id: RoomId,
        profile: JoinProfile,
        link: SharedLink,
        deliver: F,
    ) -> JoinOutcome
    where
        F: FnOnce(&JoinOutcome),
    {
        let created_room;
        let mut room = match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(entry) => {
                created_room = false;
                entry.into_ref()
            }
            Entry::Vacant(entry) => {
                created_room = true;
                tracing::info!(room = %room_id, "room created");
                entry.insert(Room::new(room_id))
            }
        };

        let member = Member::new(profile, link);
        let peer_id = member.id.clone();
        let joined = member.info();
        let replaced = room.upsert(member);
        let peers = room.peers_excluding(&peer_id);
        let roster = room.roster();

        let outcome = JoinOutcome {
            roster,
            joined,
            peers,
            replaced,
            created_room,
        };
        deliver(&outcome);
        drop(room);

        outcome
    }

    /// Update a member's mutable status fields.
    ///
    /// Fails silently (`None`) when the room or peer no longer exists, which
    /// happens for status updates arriving after a disconnect.
    ///
    /// `deliver` runs while the room's entry lock is held and must not call
    /// back into the registry.
    pub fn update_status<F>(
        &self,
        room_id: &RoomId,
        peer_id: &PeerId,
        update: StatusUpdate,
        deliver: F,
    ) -> Option<StatusOutcome>
    where
        F: FnOnce(&StatusOutcome),
    {
        let mut room = self.rooms.get_mut(room_id)?;
        let member = room.get_mut(peer_id)?;
        member.apply(update);
        let updated = member.info();
        let peers = room.peers_excluding(peer_id);

        let outcome = StatusOutcome { updated, peers };
        deliver(&outcome);

        Some(outcome)
    }

    /// Remove a peer from a room, tearing the room down when it empties.
    ///
    /// `link` identifies the caller's connection: the member is removed only
    /// when it still belongs to that connection. A leave from a connection
    /// whose entry was overwritten by a reconnect is a stale no-op, so a
    /// lingering transport can never evict the member that replaced it.
    ///
    /// Returns `None` when the room or peer is already gone, or on a stale
    /// leave. `deliver` runs while the room's entry lock is held and must
    /// not call back into the registry.
    pub fn leave<F>(
        &self,
        room_id: &RoomId,
        peer_id: &PeerId,
        link: &SharedLink,
        deliver: F,
    ) -> Option<LeaveOutcome>
    where
        F: FnOnce(&LeaveOutcome),
    {
        let Entry::Occupied(mut entry) = self.rooms.entry(room_id.clone()) else {
            return None;
        };

        let room = entry.get_mut();
        let member = room.get(peer_id)?;
        if !Arc::ptr_eq(&member.link, link) {
            tracing::debug!(room = %room_id, peer = %peer_id, "stale leave ignored");
            return None;
        }

        let removed = room.remove(peer_id)?;
        let room_closed = room.is_empty();
        let peers = room.peers_excluding(peer_id);

        let outcome = LeaveOutcome {
            removed: removed.info(),
            room_closed,
            peers,
        };
        deliver(&outcome);

        // The entry lock is still held, so an empty room is never observable.
        if room_closed {
            entry.remove();
            tracing::info!(room = %room_id, "room closed");
        }

        Some(outcome)
    }

    /// Forward a frame to a single target peer.
    pub fn relay_targeted(
        &self,
        room_id: &RoomId,
        sender_id: &PeerId,
        target_id: &PeerId,
        frame: &str,
    ) -> Result<(), RelayError> {
        let room = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RelayError::NoSuchRoom(room_id.clone()))?;
        let target = room
            .get(target_id)
            .ok_or_else(|| RelayError::NoSuchTarget(target_id.clone()))?;
        if !target.link.is_open() {
            return Err(RelayError::TargetUnreachable(target_id.clone()));
        }

        target
            .link
            .try_send(frame.to_owned())
            .map_err(|_| RelayError::TargetUnreachable(target_id.clone()))?;

        tracing::trace!(room = %room_id, sender = %sender_id, target = %target_id, "targeted relay");
        Ok(())
    }

    /// Forward a frame to every member of the room except the sender, in
    /// roster order. Returns the number of recipients reached.
    ///
    /// An unknown room yields zero; broadcast to a vanished room is a
    /// silent no-op, and a failed send to one recipient never affects the
    /// others.
    pub fn relay_broadcast(&self, room_id: &RoomId, sender_id: &PeerId, frame: &str) -> usize {
        let Some(room) = self.rooms.get(room_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (peer_id, link) in room.peers_excluding(sender_id) {
            match link.try_send(frame.to_owned()) {
                Ok(()) => delivered += 1,
                Err(error) => {
                    tracing::trace!(room = %room_id, peer = %peer_id, %error, "broadcast send failed");
                }
            }
        }
        delivered
    }

    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Number of members in a room, if it exists.
    pub fn member_count(&self, room_id: &RoomId) -> Option<usize> {
        self.rooms.get(room_id).map(|room| room.len())
    }

    /// Ordered membership snapshot of a room, if it exists.
    pub fn roster(&self, room_id: &RoomId) -> Option<Vec<MemberInfo>> {
        self.rooms.get(room_id).map(|room| room.roster())
    }
}

impl std::fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomRegistry")
            .field("rooms", &self.rooms.len())
            .finish()
    }
}
