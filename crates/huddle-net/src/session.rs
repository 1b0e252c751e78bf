//! Realtime session with the messaging backend.
//!
//! A session owns exactly one connection. It runs in a dedicated tokio task
//! and talks to its owner through a command channel (outbound events) and a
//! notification channel (inbound events and connection changes). Dropping
//! the [`RealtimeSession`] handle closes the connection; nothing reconnects.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use url::Url;

use huddle_shared::protocol::{ClientEvent, ServerEvent};
use huddle_shared::ValidationError;

use crate::error::NetError;
use crate::transport::{Connector, EventTransport};

// ---------------------------------------------------------------------------
// Command / notification types
// ---------------------------------------------------------------------------

/// Commands sent *into* the session task.
#[derive(Debug)]
enum SessionCommand {
    /// Encode and send one event.
    Emit(ClientEvent),
    /// Leave the room and close the connection.
    Shutdown,
}

/// Notifications sent *from* the session task to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotification {
    /// The connection opened and the join event went out.
    Connected,
    /// A `server_message` broadcast arrived.
    ServerMessage { text: String },
    /// An inbound frame did not match any known event and was dropped.
    Rejected { reason: String },
    /// The connection failed or closed. The session is over.
    Disconnected { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

/// Result of [`RealtimeSession::send_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Handed to the connection.
    Sent,
    /// Not connected; the event was discarded.
    Dropped,
}

/// Configuration for opening a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Websocket endpoint of the messaging backend.
    pub endpoint: Url,
    /// Room announced with `join_room` once connected.
    pub join_room: String,
}

const COMMAND_BUFFER: usize = 256;
const NOTIFICATION_BUFFER: usize = 256;

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Owner handle of a running session.
pub struct RealtimeSession {
    cmd_tx: mpsc::Sender<SessionCommand>,
    notif_rx: mpsc::Receiver<SessionNotification>,
    state_rx: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl RealtimeSession {
    /// Spawn the session task and start connecting.
    ///
    /// Returns immediately in [`ConnectionState::Connecting`]; the handshake
    /// completes in the background. Must be called inside a tokio runtime.
    pub fn open(connector: Arc<dyn Connector>, config: SessionConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
        let (notif_tx, notif_rx) = mpsc::channel(NOTIFICATION_BUFFER);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);

        let task = tokio::spawn(run_session(connector, config, cmd_rx, notif_tx, state_tx));

        Self {
            cmd_tx,
            notif_rx,
            state_rx,
            task,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Watch connection state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Emit one `client_message` carrying `text` unchanged.
    ///
    /// Blank text is rejected. While not connected the message is dropped
    /// and [`SendOutcome::Dropped`] returned; this never fails otherwise.
    pub fn send_message(&self, text: &str) -> Result<SendOutcome, ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        if !self.is_connected() {
            debug!("Not connected, dropping outbound message");
            return Ok(SendOutcome::Dropped);
        }

        match self
            .cmd_tx
            .try_send(SessionCommand::Emit(ClientEvent::message(text)))
        {
            Ok(()) => Ok(SendOutcome::Sent),
            Err(e) => {
                warn!(error = %e, "Session command queue unavailable, dropping message");
                Ok(SendOutcome::Dropped)
            }
        }
    }

    /// Wait for the next notification. `None` once the session task ended
    /// and every pending notification was received.
    pub async fn next_notification(&mut self) -> Option<SessionNotification> {
        self.notif_rx.recv().await
    }

    /// Take a pending notification without waiting.
    pub fn try_notification(&mut self) -> Option<SessionNotification> {
        self.notif_rx.try_recv().ok()
    }

    /// Leave the room, close the connection and wait for the task to end.
    ///
    /// Undelivered notifications are discarded.
    pub async fn close(self) {
        let Self {
            cmd_tx,
            notif_rx,
            task,
            ..
        } = self;
        // The task may be parked on a full notification queue.
        drop(notif_rx);
        let _ = cmd_tx.send(SessionCommand::Shutdown).await;
        drop(cmd_tx);
        if let Err(e) = task.await {
            error!(error = %e, "Session task failed");
        }
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

async fn run_session(
    connector: Arc<dyn Connector>,
    config: SessionConfig,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    notif_tx: mpsc::Sender<SessionNotification>,
    state_tx: watch::Sender<ConnectionState>,
) {
    let disconnect = |reason: String| {
        let _ = state_tx.send(ConnectionState::Disconnected);
        let notif_tx = notif_tx.clone();
        async move {
            let _ = notif_tx
                .send(SessionNotification::Disconnected { reason })
                .await;
        }
    };

    // --- Connect, unless the owner goes away first ---
    let connect = connector.connect(&config.endpoint);
    tokio::pin!(connect);

    let mut transport: Box<dyn EventTransport> = loop {
        tokio::select! {
            result = &mut connect => match result {
                Ok(transport) => break transport,
                Err(e) => {
                    warn!(endpoint = %config.endpoint, error = %e, "Realtime connection failed");
                    disconnect(e.to_string()).await;
                    return;
                }
            },
            cmd = cmd_rx.recv() => match cmd {
                Some(SessionCommand::Emit(event)) => {
                    debug!(event = event.name(), "Not connected, dropping event");
                }
                Some(SessionCommand::Shutdown) | None => {
                    info!("Session closed before the connection opened");
                    disconnect("closed by client".to_string()).await;
                    return;
                }
            },
        }
    };

    if let Err(e) = emit(transport.as_mut(), &ClientEvent::join(&config.join_room)).await {
        warn!(error = %e, "Failed to announce presence");
        let _ = transport.close().await;
        disconnect(e.to_string()).await;
        return;
    }

    let _ = state_tx.send(ConnectionState::Connected);
    info!(endpoint = %config.endpoint, room = %config.join_room, "Realtime session connected");
    let _ = notif_tx.send(SessionNotification::Connected).await;

    // --- Event loop ---
    let reason = loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(SessionCommand::Emit(event)) => {
                    if let Err(e) = emit(transport.as_mut(), &event).await {
                        warn!(event = event.name(), error = %e, "Send failed");
                        break e.to_string();
                    }
                }
                Some(SessionCommand::Shutdown) | None => {
                    let _ = emit(transport.as_mut(), &ClientEvent::leave(&config.join_room)).await;
                    if let Err(e) = transport.close().await {
                        debug!(error = %e, "Error while closing transport");
                    }
                    break "closed by client".to_string();
                }
            },

            frame = transport.next_frame() => match frame {
                Some(Ok(text)) => {
                    let notification = match ServerEvent::from_frame(&text) {
                        Ok(ServerEvent::ServerMessage(payload)) => {
                            debug!(len = payload.message.len(), "server_message received");
                            SessionNotification::ServerMessage { text: payload.message }
                        }
                        Err(e) => {
                            warn!(error = %e, "Rejected inbound frame");
                            SessionNotification::Rejected { reason: e.to_string() }
                        }
                    };
                    let _ = notif_tx.send(notification).await;
                }
                Some(Err(NetError::Protocol(e))) => {
                    warn!(error = %e, "Rejected inbound frame");
                    let _ = notif_tx
                        .send(SessionNotification::Rejected { reason: e.to_string() })
                        .await;
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Realtime transport error");
                    break e.to_string();
                }
                None => {
                    info!("Realtime connection closed by server");
                    break "closed by server".to_string();
                }
            },
        }
    };

    info!(reason = %reason, "Realtime session disconnected");
    disconnect(reason).await;
}

async fn emit(transport: &mut dyn EventTransport, event: &ClientEvent) -> Result<(), NetError> {
    let frame = event.to_frame()?;
    debug!(event = event.name(), "Emitting event");
    transport.send_frame(frame).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::memory::MemoryConnector;
    use huddle_shared::protocol::{MessagePayload, RoomPayload};

    fn config() -> SessionConfig {
        SessionConfig {
            endpoint: Url::parse("ws://localhost:8000/ws").unwrap(),
            join_room: "general".to_string(),
        }
    }

    async fn expect(session: &mut RealtimeSession) -> SessionNotification {
        tokio::time::timeout(Duration::from_secs(5), session.next_notification())
            .await
            .expect("timed out waiting for notification")
            .expect("session ended")
    }

    #[tokio::test]
    async fn test_connect_announces_join() {
        let (connector, mut peers) = MemoryConnector::new();
        let mut session = RealtimeSession::open(Arc::new(connector.clone()), config());

        let mut peer = peers.recv().await.unwrap();
        assert_eq!(peer.endpoint().as_str(), "ws://localhost:8000/ws");
        assert_eq!(
            peer.recv_event().await.unwrap().unwrap(),
            ClientEvent::JoinRoom(RoomPayload {
                room: "general".into()
            })
        );

        assert_eq!(expect(&mut session).await, SessionNotification::Connected);
        assert!(session.is_connected());
        assert_eq!(connector.connections(), 1);
    }

    #[tokio::test]
    async fn test_send_message_emits_one_event_with_raw_text() {
        let (connector, mut peers) = MemoryConnector::new();
        let mut session = RealtimeSession::open(Arc::new(connector), config());
        let mut peer = peers.recv().await.unwrap();
        let _join = peer.recv_event().await;
        assert_eq!(expect(&mut session).await, SessionNotification::Connected);

        assert_eq!(session.send_message("  hi ").unwrap(), SendOutcome::Sent);
        assert_eq!(
            peer.recv_event().await.unwrap().unwrap(),
            ClientEvent::ClientMessage(MessagePayload {
                message: "  hi ".into()
            })
        );
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let (connector, _peers) = MemoryConnector::new();
        let session = RealtimeSession::open(Arc::new(connector), config());
        assert_eq!(
            session.send_message("   "),
            Err(ValidationError::EmptyMessage)
        );
    }

    #[tokio::test]
    async fn test_inbound_messages_arrive_in_order() {
        let (connector, mut peers) = MemoryConnector::new();
        let mut session = RealtimeSession::open(Arc::new(connector), config());
        let peer = peers.recv().await.unwrap();
        assert_eq!(expect(&mut session).await, SessionNotification::Connected);

        for text in ["one", "two", "three"] {
            assert!(peer.send_message(text));
        }
        for text in ["one", "two", "three"] {
            assert_eq!(
                expect(&mut session).await,
                SessionNotification::ServerMessage { text: text.into() }
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_frames_are_rejected_without_disconnect() {
        let (connector, mut peers) = MemoryConnector::new();
        let mut session = RealtimeSession::open(Arc::new(connector), config());
        let peer = peers.recv().await.unwrap();
        assert_eq!(expect(&mut session).await, SessionNotification::Connected);

        peer.send_frame(r#"{"event":"server_message","data":{"text":"wrong field"}}"#);
        peer.send_frame("garbage");
        peer.send_message("still here");

        assert!(matches!(
            expect(&mut session).await,
            SessionNotification::Rejected { .. }
        ));
        assert!(matches!(
            expect(&mut session).await,
            SessionNotification::Rejected { .. }
        ));
        assert_eq!(
            expect(&mut session).await,
            SessionNotification::ServerMessage {
                text: "still here".into()
            }
        );
        assert!(session.is_connected());
    }

    #[tokio::test]
    async fn test_refused_connection_reports_disconnect() {
        let (connector, _peers) = MemoryConnector::new();
        connector.set_refusing(true);
        let mut session = RealtimeSession::open(Arc::new(connector), config());

        assert!(matches!(
            expect(&mut session).await,
            SessionNotification::Disconnected { .. }
        ));
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(session.send_message("hi").unwrap(), SendOutcome::Dropped);
    }

    #[tokio::test]
    async fn test_server_close_ends_session() {
        let (connector, mut peers) = MemoryConnector::new();
        let mut session = RealtimeSession::open(Arc::new(connector), config());
        let mut peer = peers.recv().await.unwrap();
        assert_eq!(expect(&mut session).await, SessionNotification::Connected);

        peer.disconnect();
        assert_eq!(
            expect(&mut session).await,
            SessionNotification::Disconnected {
                reason: "closed by server".into()
            }
        );
        assert_eq!(session.send_message("late").unwrap(), SendOutcome::Dropped);
        assert_eq!(session.next_notification().await, None);
    }

    #[tokio::test]
    async fn test_close_leaves_room_and_closes_transport() {
        let (connector, mut peers) = MemoryConnector::new();
        let mut session = RealtimeSession::open(Arc::new(connector), config());
        let mut peer = peers.recv().await.unwrap();
        assert_eq!(expect(&mut session).await, SessionNotification::Connected);

        session.close().await;

        assert!(matches!(
            peer.recv_event().await,
            Some(Ok(ClientEvent::JoinRoom(_)))
        ));
        assert_eq!(
            peer.recv_event().await.unwrap().unwrap(),
            ClientEvent::leave("general")
        );
        assert!(peer.recv_frame().await.is_none());
    }

    #[tokio::test]
    async fn test_close_with_full_notification_queue() {
        let (connector, mut peers) = MemoryConnector::new();
        let mut session = RealtimeSession::open(Arc::new(connector), config());
        let mut peer = peers.recv().await.unwrap();
        assert_eq!(expect(&mut session).await, SessionNotification::Connected);

        for i in 0..NOTIFICATION_BUFFER + 44 {
            peer.send_message(&format!("backlog {i}"));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        tokio::time::timeout(Duration::from_secs(3), session.close())
            .await
            .expect("close hung on undrained notifications");

        assert!(matches!(
            peer.recv_event().await,
            Some(Ok(ClientEvent::JoinRoom(_)))
        ));
        assert_eq!(
            peer.recv_event().await.unwrap().unwrap(),
            ClientEvent::leave("general")
        );
    }

    #[tokio::test]
    async fn test_dropping_handle_closes_transport() {
        let (connector, mut peers) = MemoryConnector::new();
        let mut session = RealtimeSession::open(Arc::new(connector), config());
        let mut peer = peers.recv().await.unwrap();
        assert_eq!(expect(&mut session).await, SessionNotification::Connected);

        drop(session);

        let mut frames = Vec::new();
        while let Some(frame) =
            tokio::time::timeout(Duration::from_secs(5), peer.recv_frame())
                .await
                .expect("transport was not closed")
        {
            frames.push(frame);
        }
        assert_eq!(frames.len(), 2, "join then leave");
    }
}
