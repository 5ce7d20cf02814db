//! Drill speed command handler

use super::{outcome, HandlerContext};
use crate::command::CommandResult;
use rover_protocol::DrillSpeed;
use tracing::info;

/// Handle DRILL_SPEED command
pub async fn handle_drill_speed(ctx: &HandlerContext, drill: &DrillSpeed) -> CommandResult {
    info!(conn_id = ctx.conn_id, "  -> Setting drill speed to {}%", drill.speed);

    outcome(
        ctx.actuator.set_drill_speed(drill.speed).await,
        format!("Drill at {}%", drill.speed),
    )
}
