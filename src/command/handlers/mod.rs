//! Command handlers for different command types

mod camera;
mod drill;
mod drive;
mod navigation;

pub use camera::handle_camera_feed;
pub use drill::handle_drill_speed;
pub use drive::{handle_joystick_move, handle_wheel_speed};
pub use navigation::handle_autonomous_mode;

use super::{Actuator, CommandResult};
use crate::session::ConnectionId;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Context passed to command handlers
#[derive(Clone)]
pub struct HandlerContext {
    pub conn_id: ConnectionId,
    pub command_id: Value,
    pub actuator: Arc<dyn Actuator>,
}

/// Handle a command type with no registered handler
pub async fn handle_unrecognized(ctx: &HandlerContext, name: &str) -> CommandResult {
    info!(
        conn_id = ctx.conn_id,
        command_id = %ctx.command_id,
        "  -> Command type: {}",
        name
    );

    CommandResult::Completed {
        message: format!("No handler for {}", name),
    }
}

/// Map an actuator call onto a handler result
fn outcome(result: anyhow::Result<()>, done: String) -> CommandResult {
    match result {
        Ok(()) => CommandResult::Completed { message: done },
        Err(e) => CommandResult::Failed {
            message: format!("{}: {:#}", done, e),
        },
    }
}
