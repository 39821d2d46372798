// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Frame encoding for protocol messages.
//!
//! A frame is the JSON encoding of one [`Message`]. Channels between the
//! orchestrator and worker threads carry frames, never Rust values.

use crate::message::{Message, MessageKind};
use thiserror::Error;

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message has no type tag")]
    MissingType,

    #[error("unknown message type: {0}")]
    UnknownType(String),

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("unexpected {kind} message on this side of the channel")]
    WrongDirection { kind: MessageKind },
}

/// Maximum frame size (16 MB)
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Encode a message to a frame
pub fn encode(msg: &Message) -> Result<Vec<u8>, ProtocolError> {
    let json = serde_json::to_vec(msg)?;

    if json.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: json.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    Ok(json)
}

/// Decode a frame, distinguishing unknown message types from malformed JSON.
pub fn decode(bytes: &[u8]) -> Result<Message, ProtocolError> {
    if bytes.len() > MAX_FRAME_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: bytes.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let tag = value
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or(ProtocolError::MissingType)?;
    if MessageKind::parse(tag).is_none() {
        return Err(ProtocolError::UnknownType(tag.to_string()));
    }

    Ok(serde_json::from_value(value)?)
}

/// Decode a frame received by the orchestrator (outcomes only).
pub fn decode_from_worker(bytes: &[u8]) -> Result<Message, ProtocolError> {
    let msg = decode(bytes)?;
    if !msg.kind().is_from_worker() {
        return Err(ProtocolError::WrongDirection { kind: msg.kind() });
    }
    Ok(msg)
}

/// Decode a frame received by a worker (dispatches only).
pub fn decode_from_orchestrator(bytes: &[u8]) -> Result<Message, ProtocolError> {
    let msg = decode(bytes)?;
    if msg.kind().is_from_worker() {
        return Err(ProtocolError::WrongDirection { kind: msg.kind() });
    }
    Ok(msg)
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
