//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration against a local development backend.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use huddle_net::{realtime_endpoint, NetError};
use huddle_shared::constants::{
    DEFAULT_BACKEND_URL, DEFAULT_JOIN_ROOM, DEFAULT_REALTIME_PATH, SEARCH_DEBOUNCE_MS,
};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend serving both HTTP and the realtime socket.
    /// Env: `HUDDLE_BACKEND_URL`
    /// Default: `http://localhost:8000`
    pub backend_url: Url,

    /// Path of the websocket endpoint under the backend URL.
    /// Env: `HUDDLE_REALTIME_PATH`
    /// Default: `/ws`
    pub realtime_path: String,

    /// Room announced once the realtime connection opens.
    /// Env: `HUDDLE_JOIN_ROOM`
    /// Default: `general`
    pub join_room: String,

    /// Name shown in the navbar and on the profile card.
    /// Env: `HUDDLE_DISPLAY_NAME`
    /// Default: `John Doe`
    pub display_name: String,

    /// Quiet period of the user directory search.
    /// Env: `HUDDLE_SEARCH_DEBOUNCE_MS`
    /// Default: `800`
    pub search_debounce: Duration,

    /// JSON file replacing the built-in message seed.
    /// Env: `HUDDLE_SEED_MESSAGES`
    /// Default: unset.
    pub seed_messages_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            realtime_path: DEFAULT_REALTIME_PATH.to_string(),
            join_room: DEFAULT_JOIN_ROOM.to_string(),
            display_name: "John Doe".to_string(),
            search_debounce: Duration::from_millis(SEARCH_DEBOUNCE_MS),
            seed_messages_path: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup("HUDDLE_BACKEND_URL") {
            match Url::parse(raw.trim()) {
                Ok(url) => config.backend_url = url,
                Err(e) => {
                    tracing::warn!(
                        value = %raw,
                        error = %e,
                        "Invalid HUDDLE_BACKEND_URL, using default"
                    );
                }
            }
        }

        if let Some(path) = lookup("HUDDLE_REALTIME_PATH") {
            if !path.trim().is_empty() {
                config.realtime_path = path.trim().to_string();
            }
        }

        if let Some(room) = lookup("HUDDLE_JOIN_ROOM") {
            if !room.trim().is_empty() {
                config.join_room = room.trim().to_string();
            }
        }

        if let Some(name) = lookup("HUDDLE_DISPLAY_NAME") {
            if !name.trim().is_empty() {
                config.display_name = name.trim().to_string();
            }
        }

        if let Some(val) = lookup("HUDDLE_SEARCH_DEBOUNCE_MS") {
            match val.trim().parse::<u64>() {
                Ok(ms) => config.search_debounce = Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!(value = %val, "Invalid HUDDLE_SEARCH_DEBOUNCE_MS, using default");
                }
            }
        }

        if let Some(path) = lookup("HUDDLE_SEED_MESSAGES") {
            if !path.trim().is_empty() {
                config.seed_messages_path = Some(PathBuf::from(path.trim()));
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    /// Websocket URL of the realtime backend.
    pub fn realtime_endpoint(&self) -> Result<Url, NetError> {
        realtime_endpoint(&self.backend_url, &self.realtime_path)
    }
}

fn default_backend_url() -> Url {
    Url::parse(DEFAULT_BACKEND_URL).expect("valid default backend url")
}
