// Network layer of the Huddle client: the realtime session and the user
// directory client.

pub mod directory;
pub mod error;
pub mod memory;
pub mod session;
pub mod transport;
pub mod ws;

pub use directory::{DirectoryClient, HttpUserDirectory, SearchState, UserSearch};
pub use error::NetError;
pub use memory::{MemoryConnector, MemoryPeer};
pub use session::{
    ConnectionState, RealtimeSession, SendOutcome, SessionConfig, SessionNotification,
};
pub use transport::{append_path, realtime_endpoint, Connector, EventTransport};
pub use ws::WebSocketConnector;
