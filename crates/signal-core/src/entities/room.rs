//! Room entity
//!
//! A named group of peers. The room owns membership consistency: peer ids
//! are unique, insertion order defines roster enumeration order, and a
//! member removed from the room is gone for good.

use super::member::{Member, MemberInfo};
use crate::link::SharedLink;
use crate::value_objects::{PeerId, RoomId};

/// A named group of peers exchanging signaling messages.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    /// Members in insertion order. Small rooms make a linear scan cheaper
    /// than a side index.
    members: Vec<Member>,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            members: Vec::new(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Insert a member, or overwrite an existing one with the same id
    /// in place (last-join-wins, roster position preserved).
    ///
    /// Returns `true` when an existing member was replaced.
    pub fn upsert(&mut self, member: Member) -> bool {
        if let Some(slot) = self.members.iter_mut().find(|m| m.id == member.id) {
            *slot = member;
            true
        } else {
            self.members.push(member);
            false
        }
    }

    /// Remove and return the member with the given id, if present.
    pub fn remove(&mut self, peer_id: &PeerId) -> Option<Member> {
        let index = self.members.iter().position(|m| &m.id == peer_id)?;
        Some(self.members.remove(index))
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == peer_id)
    }

    pub fn get_mut(&mut self, peer_id: &PeerId) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| &m.id == peer_id)
    }

    /// Full ordered snapshot of the current membership.
    pub fn roster(&self) -> Vec<MemberInfo> {
        self.members.iter().map(Member::info).collect()
    }

    /// Connection handles of every member except `exclude`, in roster order.
    pub fn peers_excluding(&self, exclude: &PeerId) -> Vec<(PeerId, SharedLink)> {
        self.members
            .iter()
            .filter(|m| &m.id != exclude)
            .map(|m| (m.id.clone(), m.link.clone()))
            .collect()
    }
}
