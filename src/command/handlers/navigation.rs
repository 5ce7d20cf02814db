//! Autonomous navigation command handler

use super::{outcome, HandlerContext};
use crate::command::CommandResult;
use rover_protocol::AutonomousMode;
use tracing::info;

/// Handle AUTONOMOUS_MODE command
///
/// Coordinates are passed through as received; range checks belong to the
/// navigation subsystem behind the actuator.
pub async fn handle_autonomous_mode(ctx: &HandlerContext, target: &AutonomousMode) -> CommandResult {
    info!(
        conn_id = ctx.conn_id,
        "  -> Autonomous navigation to {}, {}", target.latitude, target.longitude
    );

    outcome(
        ctx.actuator
            .navigate_to(target.latitude, target.longitude)
            .await,
        format!("Navigating to {}, {}", target.latitude, target.longitude),
    )
}
