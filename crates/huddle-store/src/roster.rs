//! The chat roster: an ordered list of [`ChatSummary`] records, newest
//! created chat first.

use std::collections::HashSet;

use tracing::{debug, info};

use huddle_shared::constants::{NEW_CHAT_LAST_MESSAGE, NEW_CHAT_TIME};
use huddle_shared::types::{ChatId, ChatKind};
use huddle_shared::ValidationError;

use crate::error::{Result, StoreError};
use crate::models::{ChatSummary, NewChat};

#[derive(Debug, Clone, Default)]
pub struct Roster {
    chats: Vec<ChatSummary>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from seed entries, keeping their order.
    ///
    /// Fails with [`StoreError::DuplicateChatId`] if two entries share an id.
    pub fn from_seed(chats: Vec<ChatSummary>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(chats.len());
        for chat in &chats {
            if !seen.insert(chat.id.clone()) {
                return Err(StoreError::DuplicateChatId(chat.id.clone()));
            }
        }
        Ok(Self { chats })
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatSummary> {
        self.chats.iter()
    }

    pub fn get(&self, id: &ChatId) -> Option<&ChatSummary> {
        self.chats.iter().find(|c| &c.id == id)
    }

    /// Like [`get`](Self::get) but reports a missing chat as an error.
    pub fn require(&self, id: &ChatId) -> Result<&ChatSummary> {
        self.get(id)
            .ok_or_else(|| StoreError::ChatNotFound(id.clone()))
    }

    pub fn contains(&self, id: &ChatId) -> bool {
        self.get(id).is_some()
    }

    /// Chats whose name contains `query`, ignoring case, in roster order.
    /// An empty query matches every chat.
    pub fn filter_by_name(&self, query: &str) -> Vec<&ChatSummary> {
        let needle = query.to_lowercase();
        self.chats
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect()
    }

    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Validate `new` and prepend a chat built from it.
    ///
    /// Group chats need a non-blank name; every chat needs at least one
    /// member. On failure the roster is left untouched.
    pub fn create_chat(&mut self, new: NewChat) -> Result<&ChatSummary> {
        let name = new.name.trim();
        if new.kind == ChatKind::Group && name.is_empty() {
            return Err(ValidationError::EmptyGroupName.into());
        }
        if new.members.is_empty() {
            return Err(ValidationError::NoMembers.into());
        }

        let id = self.fresh_id();
        let chat = ChatSummary {
            id,
            name: name.to_string(),
            last_message: NEW_CHAT_LAST_MESSAGE.to_string(),
            time: NEW_CHAT_TIME.to_string(),
            unread: 0,
            kind: new.kind,
            members: new.members,
        };

        info!(
            chat = %chat.id,
            kind = %chat.kind,
            members = chat.members.len(),
            "Chat created"
        );
        self.chats.insert(0, chat);
        Ok(&self.chats[0])
    }

    fn fresh_id(&self) -> ChatId {
        loop {
            let id = ChatId::generate();
            if !self.contains(&id) {
                return id;
            }
            debug!(chat = %id, "Generated chat id already taken, retrying");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use huddle_shared::types::UserId;

    fn group(name: &str, members: &[&str]) -> NewChat {
        NewChat {
            name: name.to_string(),
            members: members.iter().map(|m| UserId::from(*m)).collect(),
            kind: ChatKind::Group,
        }
    }

    fn ids(chats: &[&ChatSummary]) -> Vec<String> {
        chats.iter().map(|c| c.id.to_string()).collect()
    }

    #[test]
    fn test_filter_empty_query_returns_full_roster() {
        let roster = seed::default_roster();
        let all = roster.filter_by_name("");
        assert_eq!(all.len(), roster.len());
        assert_eq!(ids(&all), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let roster = seed::default_roster();
        let hits = roster.filter_by_name("TEAM");
        assert_eq!(ids(&hits), vec!["1", "3"]);

        let hits = roster.filter_by_name("squ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Design Squad");

        assert!(roster.filter_by_name("nonexistent").is_empty());
    }

    #[test]
    fn test_filter_only_returns_matching_names() {
        let roster = seed::default_roster();
        for query in ["a", "e", "Dev", "upd", " ", "x"] {
            let lower = query.to_lowercase();
            for chat in roster.filter_by_name(query) {
                assert!(chat.name.to_lowercase().contains(&lower));
            }
            let expected = roster
                .iter()
                .filter(|c| c.name.to_lowercase().contains(&lower))
                .count();
            assert_eq!(roster.filter_by_name(query).len(), expected);
        }
    }

    #[test]
    fn test_create_group_prepends_one_entry() {
        let mut roster = seed::default_roster();
        let before: Vec<ChatId> = roster.iter().map(|c| c.id.clone()).collect();

        let created = roster
            .create_chat(group("  Launch Crew ", &["1", "2"]))
            .unwrap()
            .clone();

        assert_eq!(roster.len(), before.len() + 1);
        assert_eq!(roster.iter().next().unwrap(), &created);
        assert_eq!(created.name, "Launch Crew");
        assert_eq!(created.unread, 0);
        assert_eq!(created.last_message, NEW_CHAT_LAST_MESSAGE);
        assert!(!before.contains(&created.id));

        let rest: Vec<ChatId> = roster.iter().skip(1).map(|c| c.id.clone()).collect();
        assert_eq!(rest, before);
    }

    #[test]
    fn test_create_group_with_blank_name_is_rejected() {
        let mut roster = seed::default_roster();
        let snapshot: Vec<ChatSummary> = roster.iter().cloned().collect();

        for name in ["", "   "] {
            let err = roster.create_chat(group(name, &["1"])).unwrap_err();
            assert!(matches!(
                err,
                StoreError::Validation(ValidationError::EmptyGroupName)
            ));
        }

        let after: Vec<ChatSummary> = roster.iter().cloned().collect();
        assert_eq!(after, snapshot);
    }

    #[test]
    fn test_create_without_members_is_rejected() {
        let mut roster = seed::default_roster();
        let err = roster.create_chat(group("Ops", &[])).unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::NoMembers)));

        let err = roster
            .create_chat(NewChat {
                name: String::new(),
                members: Vec::new(),
                kind: ChatKind::Individual,
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::NoMembers)));
        assert_eq!(roster.len(), 5);
    }

    #[test]
    fn test_individual_chat_may_have_blank_name() {
        let mut roster = Roster::new();
        let chat = roster
            .create_chat(NewChat {
                name: String::new(),
                members: vec![UserId::from("9")],
                kind: ChatKind::Individual,
            })
            .unwrap();
        assert_eq!(chat.kind, ChatKind::Individual);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_created_ids_are_never_reused() {
        let mut roster = Roster::new();
        let mut seen = HashSet::new();
        for i in 0..200 {
            let id = roster
                .create_chat(group(&format!("chat {i}"), &["1"]))
                .unwrap()
                .id
                .clone();
            assert!(seen.insert(id));
        }
    }

    #[test]
    fn test_from_seed_rejects_duplicate_ids() {
        let mut chats: Vec<ChatSummary> = seed::default_roster().iter().cloned().collect();
        chats.push(chats[0].clone());
        assert!(matches!(
            Roster::from_seed(chats),
            Err(StoreError::DuplicateChatId(id)) if id.as_str() == "1"
        ));
    }

    #[test]
    fn test_require_reports_missing_chat() {
        let roster = seed::default_roster();
        assert_eq!(roster.require(&ChatId::from("3")).unwrap().name, "Dev Team");
        assert!(matches!(
            roster.require(&ChatId::from("42")),
            Err(StoreError::ChatNotFound(_))
        ));
    }
}
