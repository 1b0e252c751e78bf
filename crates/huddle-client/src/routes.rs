//! Client-side routes.
//!
//! | path                   | route                |
//! |------------------------|----------------------|
//! | `/`                    | [`Route::SignIn`]    |
//! | `/home`                | [`Route::Home`]      |
//! | `/home/chat/:groupId`  | [`Route::Chat`]      |
//!
//! Every other path redirects to `/`.

use std::fmt;

use huddle_shared::types::ChatId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    SignIn,
    /// Shell with the empty-state placeholder.
    Home,
    /// Shell with a chat open.
    Chat(ChatId),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::SignIn,
            ["home"] => Route::Home,
            ["home", "chat", id] => Route::Chat(ChatId::from(*id)),
            _ => {
                tracing::debug!(path, "Unknown route, redirecting to sign-in");
                Route::SignIn
            }
        }
    }

    /// Whether the route belongs to the area behind the sign-in screen.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Route::SignIn)
    }

    pub fn chat_id(&self) -> Option<&ChatId> {
        match self {
            Route::Chat(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::SignIn => f.write_str("/"),
            Route::Home => f.write_str("/home"),
            Route::Chat(id) => write!(f, "/home/chat/{id}"),
        }
    }
}
