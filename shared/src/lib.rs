//! Rover Shared Protocol Types
//!
//! This crate provides the wire types and JSON codec for traffic between
//! rover control clients and the command server.

pub mod codec;
pub mod payload;
pub mod state_machine;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use payload::{
    AutonomousMode, CameraFeed, CommandKind, DrillSpeed, JoystickMove, PayloadError, WheelSpeed,
};

/// Current UTC time as ISO-8601 with microseconds and a trailing `Z`
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A command sent by a control client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Command type, e.g. `DRILL_SPEED`
    pub command: String,
    /// Opaque client-chosen identifier, echoed back in the acknowledgment
    pub id: Value,
    /// Command specific parameters; `null` reads as an empty object
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Map<String, Value>,
    /// Producer send time in whatever form the client chose; never interpreted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
}

impl Command {
    /// Build a command with an empty payload
    pub fn new(command: impl Into<String>, id: impl Into<Value>) -> Self {
        Self {
            command: command.into(),
            id: id.into(),
            data: Map::new(),
            timestamp: Some(Value::String(now_iso())),
        }
    }

    /// Add a payload field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Typed view of `command` and `data`
    pub fn kind(&self) -> Result<CommandKind, PayloadError> {
        CommandKind::from_command(self)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Acknowledgment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    /// Command was received and dispatched
    Received,
    /// Command payload failed validation (strict mode only)
    Rejected,
}

/// Acknowledgment sent back on the connection a command arrived on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgment {
    pub status: AckStatus,
    pub command_id: Value,
    pub timestamp: String,
}

impl Acknowledgment {
    /// Create an ACK for a received command
    pub fn received(command_id: Value) -> Self {
        Self::with_status(AckStatus::Received, command_id)
    }

    /// Create an ACK for a command whose payload was rejected
    pub fn rejected(command_id: Value) -> Self {
        Self::with_status(AckStatus::Rejected, command_id)
    }

    fn with_status(status: AckStatus, command_id: Value) -> Self {
        Self {
            status,
            command_id,
            timestamp: now_iso(),
        }
    }
}
