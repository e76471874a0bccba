//! Connection handling

mod connection;
mod manager;

pub use connection::{Connection, Outbound};
pub use manager::ConnectionManager;
