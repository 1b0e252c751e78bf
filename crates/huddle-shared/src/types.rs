use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Opaque chat identifier. Seeded chats use short numeric strings,
/// chats created locally use a hyphenated UUID v4.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ChatId(pub String);

impl ChatId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChatId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Sequence number of a message, local to one chat.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl MessageId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a user as assigned by the directory backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    #[default]
    Group,
    Individual,
}

impl std::fmt::Display for ChatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatKind::Group => f.write_str("group"),
            ChatKind::Individual => f.write_str("individual"),
        }
    }
}

impl std::str::FromStr for ChatKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "group" => Ok(ChatKind::Group),
            "individual" | "dm" => Ok(ChatKind::Individual),
            _ => Err(ValidationError::UnknownChatKind {
                kind: s.trim().to_string(),
            }),
        }
    }
}

/// A user returned by the directory search, candidate for a new chat.
///
/// The backend calls the login handle `username`; it is usually an email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserCandidate {
    pub id: UserId,
    pub name: String,
    #[serde(alias = "email")]
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_chat_ids_are_uuid_layout() {
        let id = ChatId::generate();
        let parsed = Uuid::parse_str(id.as_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_ne!(ChatId::generate(), id);
    }

    #[test]
    fn test_user_candidate_accepts_email_alias() {
        let json = r#"{"id":"7","name":"Alice Johnson","email":"alice@example.com"}"#;
        let user: UserCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(user.username, "alice@example.com");
        assert_eq!(user.id, UserId::from("7"));
    }

    #[test]
    fn test_chat_kind_parse() {
        assert_eq!("Group".parse::<ChatKind>().unwrap(), ChatKind::Group);
        assert_eq!("individual".parse::<ChatKind>().unwrap(), ChatKind::Individual);
        assert_eq!(" DM ".parse::<ChatKind>().unwrap(), ChatKind::Individual);
    }

    #[test]
    fn test_unknown_chat_kind_is_typed() {
        let err = " channel".parse::<ChatKind>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownChatKind {
                kind: "channel".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "Unknown chat kind: channel (expected group or individual)"
        );
    }
}
