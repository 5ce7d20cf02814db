//! Rover command server
//!
//! Accepts WebSocket connections from control clients, decodes JSON commands,
//! routes them to handlers, and acknowledges each one on the connection it
//! arrived on.

pub mod command;
pub mod config;
pub mod host;
pub mod server;
pub mod session;

pub use command::{Actuator, CommandDispatcher, LoggingActuator};
pub use config::ServerConfig;
pub use server::CommandServer;
pub use session::ConnectionRegistry;
