//! # signal-core
//!
//! Domain layer for the signaling server: room and peer identifiers, member
//! state, the room registry, and the transport seam used to push frames back
//! to peers. This crate has no dependency on the web framework.

pub mod entities;
pub mod error;
pub mod link;
pub mod registry;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{JoinProfile, Member, MemberInfo, Role, Room, StatusUpdate};
pub use error::{LinkError, RelayError};
pub use link::{PeerLink, SharedLink};
pub use registry::{JoinOutcome, LeaveOutcome, RoomRegistry, StatusOutcome};
pub use value_objects::{PeerId, RoomId};
