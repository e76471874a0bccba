//! Wire protocol definitions
//!
//! Every frame is one JSON object with a required `type` field. Client and
//! server messages are separate tagged unions; relay-class frames keep
//! their payload opaque.

mod messages;

pub use messages::{relay_target, ClientMessage, ServerMessage};
