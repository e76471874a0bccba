//! Domain entities

mod member;
mod room;

pub use member::{JoinProfile, Member, MemberInfo, Role, StatusUpdate};
pub use room::Room;
