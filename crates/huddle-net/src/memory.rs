//! In-process transport.
//!
//! [`MemoryConnector`] hands the far end of every connection it opens to the
//! owner of the matching [`MemoryPeer`] receiver, which then plays the part
//! of the messaging backend.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;
use url::Url;

use huddle_shared::protocol::{ClientEvent, MessagePayload, ServerEvent};
use huddle_shared::ProtocolError;

use crate::error::NetError;
use crate::transport::{Connector, EventTransport};

#[derive(Clone)]
pub struct MemoryConnector {
    peers_tx: mpsc::UnboundedSender<MemoryPeer>,
    refuse: Arc<AtomicBool>,
    connections: Arc<AtomicUsize>,
}

impl MemoryConnector {
    /// Create a connector and the receiver its peers are delivered on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MemoryPeer>) {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        let connector = Self {
            peers_tx,
            refuse: Arc::new(AtomicBool::new(false)),
            connections: Arc::new(AtomicUsize::new(0)),
        };
        (connector, peers_rx)
    }

    /// Make subsequent connection attempts fail.
    pub fn set_refusing(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Number of connections opened so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn EventTransport>, NetError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(NetError::ConnectionRefused(endpoint.to_string()));
        }

        let (to_peer_tx, to_peer_rx) = mpsc::unbounded_channel();
        let (to_client_tx, to_client_rx) = mpsc::unbounded_channel();

        let peer = MemoryPeer {
            endpoint: endpoint.clone(),
            inbound: to_peer_rx,
            outbound: Some(to_client_tx),
        };
        self.peers_tx
            .send(peer)
            .map_err(|_| NetError::ConnectionRefused(endpoint.to_string()))?;

        self.connections.fetch_add(1, Ordering::SeqCst);
        debug!(endpoint = %endpoint, "Memory transport connected");

        Ok(Box::new(MemoryTransport {
            to_peer: Some(to_peer_tx),
            from_peer: to_client_rx,
        }))
    }
}

struct MemoryTransport {
    to_peer: Option<mpsc::UnboundedSender<String>>,
    from_peer: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl EventTransport for MemoryTransport {
    async fn send_frame(&mut self, frame: String) -> Result<(), NetError> {
        let tx = self.to_peer.as_ref().ok_or(NetError::Closed)?;
        tx.send(frame).map_err(|_| NetError::Closed)
    }

    async fn next_frame(&mut self) -> Option<Result<String, NetError>> {
        self.from_peer.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<(), NetError> {
        self.to_peer = None;
        self.from_peer.close();
        Ok(())
    }
}

/// The backend side of one in-memory connection.
pub struct MemoryPeer {
    endpoint: Url,
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: Option<mpsc::UnboundedSender<String>>,
}

impl MemoryPeer {
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Next raw frame sent by the client, `None` once it closed.
    pub async fn recv_frame(&mut self) -> Option<String> {
        self.inbound.recv().await
    }

    /// Next client event; frames that do not decode are reported as errors.
    pub async fn recv_event(&mut self) -> Option<Result<ClientEvent, ProtocolError>> {
        let frame = self.inbound.recv().await?;
        Some(ClientEvent::from_frame(&frame))
    }

    /// Push a raw frame to the client. Returns `false` if it is gone.
    pub fn send_frame(&self, frame: impl Into<String>) -> bool {
        match &self.outbound {
            Some(tx) => tx.send(frame.into()).is_ok(),
            None => false,
        }
    }

    /// Broadcast a `server_message` to the client.
    pub fn send_message(&self, text: &str) -> bool {
        let event = ServerEvent::ServerMessage(MessagePayload {
            message: text.to_string(),
        });
        match event.to_frame() {
            Ok(frame) => self.send_frame(frame),
            Err(_) => false,
        }
    }

    /// Close the backend side; the client observes a remote close.
    pub fn disconnect(&mut self) {
        self.outbound = None;
    }
}
