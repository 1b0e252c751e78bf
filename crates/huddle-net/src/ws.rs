//! WebSocket transport built on `tokio-tungstenite`.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace};
use url::Url;

use huddle_shared::ProtocolError;

use crate::error::NetError;
use crate::transport::{Connector, EventTransport};

type RawWs = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens a websocket per connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn EventTransport>, NetError> {
        info!(endpoint = %endpoint, "Dialing realtime backend");
        let (stream, response) = tokio_tungstenite::connect_async(endpoint.as_str()).await?;
        debug!(status = %response.status(), "WebSocket handshake complete");
        Ok(Box::new(WebSocketTransport {
            stream,
            closed: false,
        }))
    }
}

struct WebSocketTransport {
    stream: RawWs,
    closed: bool,
}

#[async_trait]
impl EventTransport for WebSocketTransport {
    async fn send_frame(&mut self, frame: String) -> Result<(), NetError> {
        if self.closed {
            return Err(NetError::Closed);
        }
        trace!(len = frame.len(), "--> frame");
        self.stream.send(Message::Text(frame)).await?;
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<Result<String, NetError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => {
                    trace!(len = text.len(), "<-- frame");
                    return Some(Ok(text));
                }
                Ok(Message::Binary(data)) => {
                    return Some(Err(ProtocolError::BinaryFrame(data.len()).into()));
                }
                Ok(Message::Close(frame)) => {
                    debug!(frame = ?frame, "Close frame received");
                    self.closed = true;
                    return None;
                }
                // Ping/pong are answered by tungstenite itself.
                Ok(_) => continue,
                Err(tungstenite::Error::ConnectionClosed) => {
                    self.closed = true;
                    return None;
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), NetError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.stream.close(None).await {
            Ok(()) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
