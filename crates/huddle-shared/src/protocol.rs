//! Realtime wire events.
//!
//! Every websocket text frame carries one JSON envelope of the form
//! `{"event": "<name>", "data": { ... }}`. Outbound and inbound events are
//! separate enums so the client can never decode its own event kinds as
//! server traffic.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Events emitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Announce presence in a room right after the connection opens.
    JoinRoom(RoomPayload),

    /// Leave a room before an orderly close.
    LeaveRoom(RoomPayload),

    /// A chat message typed by the local user. Carries the raw text.
    ClientMessage(MessagePayload),
}

/// Events broadcast by the messaging backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ServerMessage(MessagePayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoomPayload {
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePayload {
    pub message: String,
}

impl ClientEvent {
    pub fn join(room: impl Into<String>) -> Self {
        Self::JoinRoom(RoomPayload { room: room.into() })
    }

    pub fn leave(room: impl Into<String>) -> Self {
        Self::LeaveRoom(RoomPayload { room: room.into() })
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self::ClientMessage(MessagePayload {
            message: text.into(),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinRoom(_) => "join_room",
            ClientEvent::LeaveRoom(_) => "leave_room",
            ClientEvent::ClientMessage(_) => "client_message",
        }
    }

    /// Encode as a JSON text frame.
    pub fn to_frame(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    pub fn from_frame(frame: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(frame).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

impl ServerEvent {
    pub fn to_frame(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Decode an inbound text frame. Anything that is not a well-formed
    /// `server_message` with a string `message` field is rejected.
    pub fn from_frame(frame: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(frame).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}
