//! # signal-gateway
//!
//! WebSocket gateway relaying signaling messages between the peers of an
//! audio room. Each connection runs its own session state machine against
//! the shared room registry; a periodic liveness monitor reaps connections
//! that stop answering probes.

pub mod connection;
pub mod liveness;
pub mod protocol;
pub mod server;
pub mod session;

pub use server::{create_app, create_gateway_state, run, serve, GatewayState};
