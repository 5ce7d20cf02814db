//! Typed command payloads
//!
//! `Command::data` is an untyped JSON object on the wire. This module turns a
//! `(command, data)` pair into a [`CommandKind`], validating the fields each
//! command type needs. Unknown command names are not an error: they map to
//! [`CommandKind::Unrecognized`].

use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};
use thiserror::Error;

use crate::Command;

pub const JOYSTICK_MOVE: &str = "JOYSTICK_MOVE";
pub const DRILL_SPEED: &str = "DRILL_SPEED";
pub const WHEEL_SPEED: &str = "WHEEL_SPEED";
pub const CAMERA_FEED: &str = "CAMERA_FEED";
pub const AUTONOMOUS_MODE: &str = "AUTONOMOUS_MODE";

/// Errors raised while validating a command payload
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Invalid {command} payload: {source}")]
    InvalidData {
        command: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Joystick movement vector
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct JoystickMove {
    pub x: f64,
    pub y: f64,
}

/// Drill speed setpoint in percent
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DrillSpeed {
    pub speed: f64,
}

/// Per-wheel speed setpoint in percent
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WheelSpeed {
    #[serde(deserialize_with = "identifier")]
    pub wheel: String,
    pub speed: f64,
}

/// Camera stream toggle
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CameraFeed {
    #[serde(deserialize_with = "identifier")]
    pub camera: String,
    pub enabled: bool,
}

/// Autonomous navigation target
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AutonomousMode {
    pub latitude: f64,
    pub longitude: f64,
}

/// A command routed by type, with its payload validated
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    JoystickMove(JoystickMove),
    DrillSpeed(DrillSpeed),
    WheelSpeed(WheelSpeed),
    CameraFeed(CameraFeed),
    AutonomousMode(AutonomousMode),
    /// Any other command name; the payload is left unchecked
    Unrecognized(String),
}

impl CommandKind {
    /// Route a command by name and validate its payload
    pub fn from_command(command: &Command) -> Result<Self, PayloadError> {
        let kind = match command.command.as_str() {
            JOYSTICK_MOVE => Self::JoystickMove(parse(JOYSTICK_MOVE, command)?),
            DRILL_SPEED => Self::DrillSpeed(parse(DRILL_SPEED, command)?),
            WHEEL_SPEED => Self::WheelSpeed(parse(WHEEL_SPEED, command)?),
            CAMERA_FEED => Self::CameraFeed(parse(CAMERA_FEED, command)?),
            AUTONOMOUS_MODE => Self::AutonomousMode(parse(AUTONOMOUS_MODE, command)?),
            other => Self::Unrecognized(other.to_string()),
        };
        Ok(kind)
    }

    /// Wire name of this command
    pub fn name(&self) -> &str {
        match self {
            Self::JoystickMove(_) => JOYSTICK_MOVE,
            Self::DrillSpeed(_) => DRILL_SPEED,
            Self::WheelSpeed(_) => WHEEL_SPEED,
            Self::CameraFeed(_) => CAMERA_FEED,
            Self::AutonomousMode(_) => AUTONOMOUS_MODE,
            Self::Unrecognized(name) => name,
        }
    }
}

fn parse<T>(name: &'static str, command: &Command) -> Result<T, PayloadError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(Value::Object(command.data.clone())).map_err(|source| {
        PayloadError::InvalidData {
            command: name,
            source,
        }
    })
}

/// Accept a string or a number as an identifier
fn identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joystick_move() {
        let cmd = Command::new(JOYSTICK_MOVE, "j1").with("x", 0.5).with("y", -1);
        let kind = cmd.kind().expect("valid payload");
        assert_eq!(kind, CommandKind::JoystickMove(JoystickMove { x: 0.5, y: -1.0 }));
        assert_eq!(kind.name(), JOYSTICK_MOVE);
    }

    #[test]
    fn test_wheel_speed_numeric_identifier() {
        let cmd = Command::new(WHEEL_SPEED, "w1").with("wheel", 3).with("speed", 75);
        match cmd.kind().expect("valid payload") {
            CommandKind::WheelSpeed(w) => {
                assert_eq!(w.wheel, "3");
                assert_eq!(w.speed, 75.0);
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_camera_feed() {
        let cmd = Command::new(CAMERA_FEED, "cam")
            .with("camera", "front")
            .with("enabled", true);
        assert_eq!(
            cmd.kind().unwrap(),
            CommandKind::CameraFeed(CameraFeed {
                camera: "front".into(),
                enabled: true
            })
        );
    }

    #[test]
    fn test_missing_field_is_payload_error() {
        let cmd = Command::new(DRILL_SPEED, "d1");
        let err = cmd.kind().unwrap_err();
        let message = err.to_string();
        assert!(message.contains(DRILL_SPEED), "{}", message);
        assert!(message.contains("speed"), "{}", message);
    }

    #[test]
    fn test_wrong_type_is_payload_error() {
        let cmd = Command::new(AUTONOMOUS_MODE, "a1")
            .with("latitude", "north")
            .with("longitude", 4.2);
        assert!(matches!(
            cmd.kind(),
            Err(PayloadError::InvalidData {
                command: AUTONOMOUS_MODE,
                ..
            })
        ));
    }

    #[test]
    fn test_extra_fields_ignored() {
        let cmd = Command::new(DRILL_SPEED, "d2")
            .with("speed", 10)
            .with("ramp", "slow");
        assert_eq!(
            cmd.kind().unwrap(),
            CommandKind::DrillSpeed(DrillSpeed { speed: 10.0 })
        );
    }

    #[test]
    fn test_unrecognized_command_is_not_an_error() {
        let cmd = Command::new("UNKNOWN_X", "c2").with("anything", Value::Null);
        let kind = cmd.kind().expect("unknown commands are accepted");
        assert_eq!(kind, CommandKind::Unrecognized("UNKNOWN_X".into()));
        assert_eq!(kind.name(), "UNKNOWN_X");
    }
}
