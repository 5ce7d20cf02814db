//! Actuator seam between command handlers and rover hardware

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

/// External collaborators reached by command handlers
///
/// Implement this to attach motor, drill, camera, or navigation controllers.
/// Errors are reported back to the dispatcher and logged; they never close the
/// connection the command arrived on.
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Drive along a joystick vector
    async fn drive(&self, x: f64, y: f64) -> Result<()>;

    /// Set the drill motor speed in percent
    async fn set_drill_speed(&self, percent: f64) -> Result<()>;

    /// Set the speed of one wheel in percent
    async fn set_wheel_speed(&self, wheel: &str, percent: f64) -> Result<()>;

    /// Start or stop a camera stream
    async fn set_camera(&self, camera: &str, enabled: bool) -> Result<()>;

    /// Start autonomous navigation toward a coordinate
    async fn navigate_to(&self, latitude: f64, longitude: f64) -> Result<()>;
}

/// Actuator with no hardware behind it; every request is logged and accepted
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingActuator;

#[async_trait]
impl Actuator for LoggingActuator {
    async fn drive(&self, x: f64, y: f64) -> Result<()> {
        debug!(x, y, "no motor controller attached");
        Ok(())
    }

    async fn set_drill_speed(&self, percent: f64) -> Result<()> {
        debug!(percent, "no drill controller attached");
        Ok(())
    }

    async fn set_wheel_speed(&self, wheel: &str, percent: f64) -> Result<()> {
        debug!(wheel, percent, "no wheel controller attached");
        Ok(())
    }

    async fn set_camera(&self, camera: &str, enabled: bool) -> Result<()> {
        debug!(camera, enabled, "no camera streamer attached");
        Ok(())
    }

    async fn navigate_to(&self, latitude: f64, longitude: f64) -> Result<()> {
        debug!(latitude, longitude, "no navigation subsystem attached");
        Ok(())
    }
}
