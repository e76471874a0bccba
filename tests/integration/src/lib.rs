//! Integration test utilities for the signaling server
//!
//! This crate provides helpers for running end-to-end tests against the
//! WebSocket gateway.

pub mod helpers;

pub use helpers::*;
