//! Example data the stores start from.
//!
//! The message seed can be replaced with a JSON file holding an array of
//! `{"sender", "text", "time", "isOwn"}` objects.

use std::path::Path;

use tracing::info;

use huddle_shared::constants::OWN_SENDER;
use huddle_shared::types::{ChatId, ChatKind};

use crate::error::Result;
use crate::models::{ChatSummary, SeedMessage};
use crate::roster::Roster;

/// The sidebar a fresh session starts with.
pub fn default_roster() -> Roster {
    let chats = [
        ("1", "Team Alpha", "Great work on the project!", "10:30 AM", 2),
        ("2", "Design Squad", "Updated mockups are ready", "9:15 AM", 0),
        ("3", "Dev Team", "Merge conflict resolved", "Yesterday", 5),
        ("4", "Marketing", "Campaign launching next week", "Yesterday", 0),
        ("5", "Product Updates", "New features deployed", "Tuesday", 1),
    ]
    .into_iter()
    .map(|(id, name, last_message, time, unread)| ChatSummary {
        id: ChatId::from(id),
        name: name.to_string(),
        last_message: last_message.to_string(),
        time: time.to_string(),
        unread,
        kind: ChatKind::Group,
        members: Vec::new(),
    })
    .collect();

    Roster::from_seed(chats).unwrap_or_default()
}

/// Messages every opened chat starts with.
pub fn default_messages() -> Vec<SeedMessage> {
    vec![
        seed_message("Alice", "Hey everyone!", "10:25 AM", false),
        seed_message(OWN_SENDER, "Hi Alice! How are things?", "10:27 AM", true),
        seed_message("Bob", "Great work on the project!", "10:30 AM", false),
    ]
}

/// Load a message seed from a JSON file.
pub fn load_messages(path: &Path) -> Result<Vec<SeedMessage>> {
    let raw = std::fs::read_to_string(path)?;
    let seed: Vec<SeedMessage> = serde_json::from_str(&raw)?;
    info!(path = %path.display(), count = seed.len(), "Loaded message seed");
    Ok(seed)
}

fn seed_message(sender: &str, text: &str, time: &str, is_own: bool) -> SeedMessage {
    SeedMessage {
        sender: sender.to_string(),
        text: text.to_string(),
        time: time.to_string(),
        is_own,
    }
}
