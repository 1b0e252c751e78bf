/// Application name
pub const APP_NAME: &str = "Huddle";

/// Backend base URL used when none is configured
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Path of the realtime websocket endpoint under the backend base URL
pub const DEFAULT_REALTIME_PATH: &str = "/ws";

/// Room announced with `join_room` once the realtime connection opens
pub const DEFAULT_JOIN_ROOM: &str = "general";

/// Path of the user directory search endpoint
pub const USER_SEARCH_PATH: &str = "/users/search";

/// Quiet period after the last keystroke before a directory search fires
pub const SEARCH_DEBOUNCE_MS: u64 = 800;

/// Display name of messages typed by the local user
pub const OWN_SENDER: &str = "You";

/// Display name of messages broadcast by the realtime backend
pub const SERVER_SENDER: &str = "Server";

/// Document upload allow-list (lowercase extensions)
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "txt", "docx", "mp3", "wav"];

/// Maximum document size in bytes (20 MiB)
pub const MAX_DOCUMENT_SIZE: u64 = 20 * 1024 * 1024;

/// Image upload allow-list (lowercase extensions)
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Maximum image size in bytes (10 MiB)
pub const MAX_IMAGE_SIZE: u64 = 10 * 1024 * 1024;

/// Last-message placeholder of a freshly created chat
pub const NEW_CHAT_LAST_MESSAGE: &str = "No messages yet";

/// Time label of a freshly created chat
pub const NEW_CHAT_TIME: &str = "Just now";
