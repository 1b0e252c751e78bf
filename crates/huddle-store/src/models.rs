//! Domain model structs held by the in-memory stores.
//!
//! Every struct derives `Serialize` and `Deserialize` so seeds can be loaded
//! from JSON and views can be dumped for debugging.

use serde::{Deserialize, Serialize};

use huddle_shared::types::{ChatId, ChatKind, MessageId, UserId};

// ---------------------------------------------------------------------------
// Chat summary
// ---------------------------------------------------------------------------

/// One roster entry, as shown in the sidebar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatSummary {
    /// Unique within the roster.
    pub id: ChatId,
    /// Display name.
    pub name: String,
    /// Preview of the most recent message.
    pub last_message: String,
    /// Display time of the most recent message.
    pub time: String,
    /// Unread counter.
    pub unread: u32,
    /// How the chat was created.
    #[serde(default)]
    pub kind: ChatKind,
    /// Members selected when the chat was created. Empty for seeded chats.
    #[serde(default)]
    pub members: Vec<UserId>,
}

/// Input of [`Roster::create_chat`](crate::Roster::create_chat).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChat {
    pub name: String,
    pub members: Vec<UserId>,
    pub kind: ChatKind,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Sequence number local to the chat.
    pub id: MessageId,
    /// Display name of the author.
    pub sender: String,
    pub text: String,
    /// Display time.
    pub time: String,
    /// Authored by the local user (rendered right-aligned).
    pub is_own: bool,
}

/// Seed entry a [`MessageLog`](crate::MessageLog) starts from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeedMessage {
    pub sender: String,
    pub text: String,
    pub time: String,
    #[serde(default)]
    pub is_own: bool,
}
