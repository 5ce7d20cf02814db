//! Drive command handlers (joystick, individual wheels)

use super::{outcome, HandlerContext};
use crate::command::CommandResult;
use rover_protocol::{JoystickMove, WheelSpeed};
use tracing::info;

/// Handle JOYSTICK_MOVE command
pub async fn handle_joystick_move(ctx: &HandlerContext, mv: &JoystickMove) -> CommandResult {
    info!(conn_id = ctx.conn_id, "  -> Moving: X={:.2}, Y={:.2}", mv.x, mv.y);

    outcome(
        ctx.actuator.drive(mv.x, mv.y).await,
        format!("Drive vector ({:.2}, {:.2})", mv.x, mv.y),
    )
}

/// Handle WHEEL_SPEED command
pub async fn handle_wheel_speed(ctx: &HandlerContext, wheel: &WheelSpeed) -> CommandResult {
    info!(
        conn_id = ctx.conn_id,
        "  -> Setting {} speed to {}%", wheel.wheel, wheel.speed
    );

    outcome(
        ctx.actuator.set_wheel_speed(&wheel.wheel, wheel.speed).await,
        format!("Wheel {} at {}%", wheel.wheel, wheel.speed),
    )
}
