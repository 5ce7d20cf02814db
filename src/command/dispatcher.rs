//! Command dispatcher - decodes, routes, and acknowledges incoming commands

use super::handlers::{self, HandlerContext};
use super::Actuator;
use crate::session::ConnectionId;
use rover_protocol::{codec, Acknowledgment, Command, CommandKind};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of command handling
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Handler ran and the actuator accepted the request
    Completed { message: String },
    /// Handler ran but the actuator reported an error
    Failed { message: String },
    /// Payload did not match the command type; no handler ran
    Rejected { message: String },
}

/// Routes decoded commands to handlers and builds acknowledgments
pub struct CommandDispatcher {
    actuator: Arc<dyn Actuator>,
    strict_acks: bool,
}

impl CommandDispatcher {
    /// Create a dispatcher that acknowledges every decoded command as received
    pub fn new(actuator: Arc<dyn Actuator>) -> Self {
        Self {
            actuator,
            strict_acks: false,
        }
    }

    /// Acknowledge payload validation failures with a `rejected` status
    pub fn with_strict_acks(mut self, strict: bool) -> Self {
        self.strict_acks = strict;
        self
    }

    /// Handle a text frame
    ///
    /// Returns `None` when the frame is not a command; the caller must not
    /// reply in that case.
    pub async fn handle_text(&self, conn_id: ConnectionId, text: &str) -> Option<Acknowledgment> {
        match codec::decode(text) {
            Ok(command) => Some(self.execute(conn_id, &command).await),
            Err(e) => {
                warn!(conn_id, error = %e, "Invalid JSON received: {}", text);
                None
            }
        }
    }

    /// Handle a binary frame carrying UTF-8 JSON
    pub async fn handle_binary(
        &self,
        conn_id: ConnectionId,
        bytes: &[u8],
    ) -> Option<Acknowledgment> {
        match codec::decode_bytes(bytes) {
            Ok(command) => Some(self.execute(conn_id, &command).await),
            Err(e) => {
                warn!(
                    conn_id,
                    error = %e,
                    "Invalid binary message received: {}",
                    String::from_utf8_lossy(bytes)
                );
                None
            }
        }
    }

    /// Dispatch a decoded command and return its acknowledgment
    pub async fn execute(&self, conn_id: ConnectionId, command: &Command) -> Acknowledgment {
        info!(conn_id, "Received command: {}", command.command);
        info!(conn_id, "  ID: {}", command.id);
        info!(
            conn_id,
            "  Data: {}",
            serde_json::to_string(&command.data).unwrap_or_default()
        );
        match &command.timestamp {
            Some(Value::String(ts)) => info!(conn_id, "  Timestamp: {}", ts),
            Some(other) => info!(conn_id, "  Timestamp: {}", other),
            None => info!(conn_id, "  Timestamp: -"),
        }

        let ctx = HandlerContext {
            conn_id,
            command_id: command.id.clone(),
            actuator: self.actuator.clone(),
        };

        let result = match command.kind() {
            Ok(kind) => self.route(&ctx, &kind).await,
            Err(e) => CommandResult::Rejected {
                message: e.to_string(),
            },
        };

        match result {
            CommandResult::Completed { message } => {
                debug!(conn_id, command_id = %command.id, "Command completed: {}", message);
                Acknowledgment::received(command.id.clone())
            }
            CommandResult::Failed { message } => {
                warn!(conn_id, command_id = %command.id, "Command failed: {}", message);
                Acknowledgment::received(command.id.clone())
            }
            CommandResult::Rejected { message } => {
                warn!(conn_id, command_id = %command.id, "Error processing command: {}", message);
                if self.strict_acks {
                    Acknowledgment::rejected(command.id.clone())
                } else {
                    Acknowledgment::received(command.id.clone())
                }
            }
        }
    }

    async fn route(&self, ctx: &HandlerContext, kind: &CommandKind) -> CommandResult {
        match kind {
            CommandKind::JoystickMove(mv) => handlers::handle_joystick_move(ctx, mv).await,
            CommandKind::DrillSpeed(drill) => handlers::handle_drill_speed(ctx, drill).await,
            CommandKind::WheelSpeed(wheel) => handlers::handle_wheel_speed(ctx, wheel).await,
            CommandKind::CameraFeed(feed) => handlers::handle_camera_feed(ctx, feed).await,
            CommandKind::AutonomousMode(target) => {
                handlers::handle_autonomous_mode(ctx, target).await
            }
            CommandKind::Unrecognized(name) => handlers::handle_unrecognized(ctx, name).await,
        }
    }
}
