//! Append-only message log of one open chat.

use chrono::Local;
use tracing::debug;

use huddle_shared::types::{ChatId, MessageId};

use crate::models::{Message, SeedMessage};

/// Ordered messages of one chat. The only mutation is appending; ids are
/// assigned by the log and strictly increase.
#[derive(Debug, Clone)]
pub struct MessageLog {
    chat_id: ChatId,
    messages: Vec<Message>,
    next_id: MessageId,
}

impl MessageLog {
    /// Create an empty log for `chat_id`.
    pub fn new(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            messages: Vec::new(),
            next_id: MessageId(1),
        }
    }

    /// Create a log pre-populated with `seed`, numbered from 1.
    pub fn with_seed(chat_id: ChatId, seed: &[SeedMessage]) -> Self {
        let mut log = Self::new(chat_id);
        for entry in seed {
            log.push(&entry.sender, &entry.text, entry.time.clone(), entry.is_own);
        }
        log
    }

    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Append a message authored by the local user.
    pub fn append_own(&mut self, sender: &str, text: &str) -> &Message {
        self.push(sender, text, display_time(), true)
    }

    /// Append a message received from the realtime backend.
    pub fn append_inbound(&mut self, sender: &str, text: &str) -> &Message {
        self.push(sender, text, display_time(), false)
    }

    fn push(&mut self, sender: &str, text: &str, time: String, is_own: bool) -> &Message {
        let id = self.next_id;
        self.next_id = id.next();
        self.messages.push(Message {
            id,
            sender: sender.to_string(),
            text: text.to_string(),
            time,
            is_own,
        });
        debug!(chat = %self.chat_id, msg = %id, own = is_own, "Message appended");
        &self.messages[self.messages.len() - 1]
    }
}

/// Wall-clock time in the `10:27 AM` style used by the seed messages.
pub fn display_time() -> String {
    Local::now().format("%-I:%M %p").to_string()
}
