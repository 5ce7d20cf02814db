//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

/// Port control clients connect to
pub const DEFAULT_PORT: u16 = 8080;

/// Configuration for the command server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (all interfaces by default)
    pub bind_addr: SocketAddr,
    /// Close a connection when no frame arrives for this long.
    /// `None` keeps silent peers connected indefinitely.
    pub idle_timeout: Option<Duration>,
    /// Acknowledge invalid payloads with `rejected` instead of `received`
    pub strict_acks: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            idle_timeout: None,
            strict_acks: false,
        }
    }
}
