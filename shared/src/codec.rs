//! JSON codec for WebSocket frames
//!
//! Every frame carries one JSON object:
//! ```text
//! inbound:  {"command": "...", "id": <any>, "data": {...}, "timestamp": "..."}
//! outbound: {"status": "received", "command_id": <id>, "timestamp": "...Z"}
//! ```

use thiserror::Error;

use crate::{Acknowledgment, Command};

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Message is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Message is not a valid command: {0}")]
    InvalidCommand(#[from] serde_json::Error),

    #[error("Acknowledgment encode error: {0}")]
    EncodeError(#[source] serde_json::Error),
}

/// Decode a command from a text frame
pub fn decode(text: &str) -> Result<Command, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode a command from a binary frame holding UTF-8 JSON
pub fn decode_bytes(bytes: &[u8]) -> Result<Command, CodecError> {
    decode(std::str::from_utf8(bytes)?)
}

/// Encode an acknowledgment as a JSON text frame
pub fn encode(ack: &Acknowledgment) -> Result<String, CodecError> {
    serde_json::to_string(ack).map_err(CodecError::EncodeError)
}
