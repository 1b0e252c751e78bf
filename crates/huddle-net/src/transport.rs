//! Transport seam of the realtime session.
//!
//! The session task only ever sees an [`EventTransport`]: a bidirectional
//! stream of text frames. A [`Connector`] produces one per connection, so the
//! websocket implementation can be swapped for the in-memory one in tests.

use async_trait::async_trait;
use url::Url;

use crate::error::NetError;

/// An open connection carrying JSON text frames.
#[async_trait]
pub trait EventTransport: Send {
    /// Send one text frame.
    async fn send_frame(&mut self, frame: String) -> Result<(), NetError>;

    /// Wait for the next text frame. `None` once the remote side closed.
    ///
    /// Must be cancel-safe: the session polls it inside `tokio::select!`.
    async fn next_frame(&mut self) -> Option<Result<String, NetError>>;

    /// Close the connection. Closing twice is not an error.
    async fn close(&mut self) -> Result<(), NetError>;
}

/// A factory responsible for opening new transports.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn EventTransport>, NetError>;
}

/// Derive the websocket endpoint from the backend base URL.
///
/// `http` becomes `ws` and `https` becomes `wss`; `ws`/`wss` are kept.
pub fn realtime_endpoint(base: &Url, path: &str) -> Result<Url, NetError> {
    let scheme = match base.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(NetError::UnsupportedScheme(other.to_string())),
    };

    let mut url = append_path(base, path)?;
    url.set_scheme(scheme)
        .map_err(|_| NetError::UnsupportedScheme(base.scheme().to_string()))?;
    Ok(url)
}

/// Append `path` below the base URL's own path.
///
/// `https://host/api` plus `/users/search` is `https://host/api/users/search`;
/// a trailing slash on the base makes no difference.
pub fn append_path(base: &Url, path: &str) -> Result<Url, NetError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(path.split('/').filter(|s| !s.is_empty()));
    Ok(url)
}
