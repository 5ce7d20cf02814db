//! Camera feed command handler

use super::{outcome, HandlerContext};
use crate::command::CommandResult;
use rover_protocol::CameraFeed;
use tracing::info;

/// Handle CAMERA_FEED command
pub async fn handle_camera_feed(ctx: &HandlerContext, feed: &CameraFeed) -> CommandResult {
    let state = if feed.enabled { "ON" } else { "OFF" };
    info!(conn_id = ctx.conn_id, "  -> Camera {}: {}", feed.camera, state);

    outcome(
        ctx.actuator.set_camera(&feed.camera, feed.enabled).await,
        format!("Camera {} {}", feed.camera, state),
    )
}
