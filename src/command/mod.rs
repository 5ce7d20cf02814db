//! Command dispatch for inbound client messages
//!
//! This module handles:
//! - Decoding frames into commands
//! - Routing each command type to its handler
//! - Building the acknowledgment sent back to the client

mod actuator;
mod dispatcher;
pub mod handlers;

pub use actuator::{Actuator, LoggingActuator};
pub use dispatcher::{CommandDispatcher, CommandResult};
