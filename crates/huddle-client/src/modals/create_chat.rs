//! Create-chat flow: chat kind, group name, member search and selection.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use huddle_net::{DirectoryClient, SearchState, UserSearch};
use huddle_shared::types::{ChatKind, UserCandidate, UserId};
use huddle_store::NewChat;

pub struct CreateChatFlow {
    kind: ChatKind,
    name: String,
    directory: DirectoryClient,
    selected: Vec<UserCandidate>,
}

impl CreateChatFlow {
    /// Must be called inside a tokio runtime once searching starts.
    pub fn new(directory: Arc<dyn UserSearch>, debounce: Duration) -> Self {
        Self {
            kind: ChatKind::Group,
            name: String::new(),
            directory: DirectoryClient::new(directory, debounce),
            selected: Vec::new(),
        }
    }

    pub fn kind(&self) -> ChatKind {
        self.kind
    }

    /// Switching to an individual chat keeps only the most recent pick.
    pub fn set_kind(&mut self, kind: ChatKind) {
        self.kind = kind;
        if kind == ChatKind::Individual && self.selected.len() > 1 {
            self.selected.drain(..self.selected.len() - 1);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn query(&self) -> &str {
        self.directory.query()
    }

    /// Keystroke in the member search box.
    pub fn set_query(&mut self, query: &str) {
        self.directory.set_query(query);
    }

    pub fn search_state(&self) -> SearchState {
        self.directory.state()
    }

    pub fn subscribe_search(&self) -> tokio::sync::watch::Receiver<SearchState> {
        self.directory.subscribe()
    }

    pub fn selected(&self) -> &[UserCandidate] {
        &self.selected
    }

    pub fn is_selected(&self, id: &UserId) -> bool {
        self.selected.iter().any(|user| &user.id == id)
    }

    /// Group chats toggle membership; individual chats replace the pick.
    pub fn select(&mut self, user: UserCandidate) {
        match self.kind {
            ChatKind::Individual => {
                self.selected.clear();
                self.selected.push(user);
            }
            ChatKind::Group => {
                if self.is_selected(&user.id) {
                    self.unselect(&user.id);
                } else {
                    self.selected.push(user);
                }
            }
        }
    }

    pub fn unselect(&mut self, id: &UserId) {
        self.selected.retain(|user| &user.id != id);
    }

    /// Select the `index`-th user of the current search results.
    pub fn pick(&mut self, index: usize) -> Option<UserCandidate> {
        let user = self.search_state().users().get(index).cloned()?;
        debug!(user = %user.id, "Search result picked");
        self.select(user.clone());
        Some(user)
    }

    /// The chat this flow would create. An individual chat without a name
    /// is named after the selected user.
    pub fn request(&self) -> NewChat {
        let mut name = self.name.trim().to_string();
        if self.kind == ChatKind::Individual && name.is_empty() {
            if let Some(user) = self.selected.first() {
                name = user.name.clone();
            }
        }
        NewChat {
            name,
            members: self.selected.iter().map(|user| user.id.clone()).collect(),
            kind: self.kind,
        }
    }
}
