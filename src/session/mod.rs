//! Session management for connected control clients
//!
//! This module handles:
//! - Tracking all open client connections
//! - The per-connection receive, dispatch, acknowledge loop

mod connection;
mod registry;

pub use connection::Session;
pub use registry::{ConnectionId, ConnectionInfo, ConnectionRegistry};
