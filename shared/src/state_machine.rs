//! Connection State Machine
//!
//! A connection is `Open` from the moment it is registered until its session
//! ends, then `Closed` for good. There is no other transition.

use std::fmt;
use thiserror::Error;

/// Lifecycle state of one client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closed,
}

/// Why a connection left the `Open` state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Peer sent a close frame
    ClientClosed,
    /// Stream ended without a close frame
    StreamEnded,
    /// Fatal read error on the socket
    ReadError(String),
    /// Acknowledgment could not be written
    WriteError(String),
    /// No frame arrived within the configured idle timeout
    IdleTimeout,
    /// Session task panicked
    Aborted,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::ClientClosed => write!(f, "client closed"),
            CloseReason::StreamEnded => write!(f, "stream ended"),
            CloseReason::ReadError(e) => write!(f, "read error: {}", e),
            CloseReason::WriteError(e) => write!(f, "write error: {}", e),
            CloseReason::IdleTimeout => write!(f, "idle timeout"),
            CloseReason::Aborted => write!(f, "session aborted"),
        }
    }
}

/// Invalid transition attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Connection already closed ({previous})")]
    AlreadyClosed { previous: CloseReason },
}

/// Tracks the state of a single connection
#[derive(Debug)]
pub struct ConnectionLifecycle {
    state: ConnectionState,
    close_reason: Option<CloseReason>,
}

impl Default for ConnectionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionLifecycle {
    /// Create a lifecycle in the `Open` state
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Open,
            close_reason: None,
        }
    }

    /// Get current state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Reason recorded by the `Open -> Closed` transition
    pub fn close_reason(&self) -> Option<&CloseReason> {
        self.close_reason.as_ref()
    }

    /// Move to `Closed`. Only the first call succeeds.
    pub fn close(&mut self, reason: CloseReason) -> Result<(), TransitionError> {
        match self.state {
            ConnectionState::Open => {
                self.state = ConnectionState::Closed;
                self.close_reason = Some(reason);
                Ok(())
            }
            ConnectionState::Closed => Err(TransitionError::AlreadyClosed {
                previous: self.close_reason.clone().unwrap_or(CloseReason::StreamEnded),
            }),
        }
    }
}
