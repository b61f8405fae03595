//! Transport layer abstraction for the sync agent.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use dinemap_protocol::SyncEvent;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

/// Opens connections to the server.
///
/// This trait abstracts the network layer so the agent can be driven by
/// a real socket or by a scripted mock.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Connects to `url` and returns the stream of inbound text frames.
    async fn connect(&self, url: &str) -> SyncResult<Box<dyn EventStream>>;
}

/// Inbound side of one open connection.
#[async_trait]
pub trait EventStream: Send {
    /// Waits for the next text frame.
    ///
    /// Returns `None` once the server has closed the connection.
    async fn next_frame(&mut self) -> Option<SyncResult<String>>;

    /// Closes the connection.
    async fn close(&mut self);
}

/// Connector over a real WebSocket.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    /// Creates a new connector.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &str) -> SyncResult<Box<dyn EventStream>> {
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(SyncError::InvalidUrl(url.to_string()));
        }

        let (socket, response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(connect_error)?;
        debug!(url, status = %response.status(), "socket handshake complete");

        Ok(Box::new(WebSocketEventStream { socket }))
    }
}

fn connect_error(e: tungstenite::Error) -> SyncError {
    match e {
        tungstenite::Error::Url(e) => SyncError::InvalidUrl(e.to_string()),
        e => SyncError::transport_retryable(e.to_string()),
    }
}

struct WebSocketEventStream {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl EventStream for WebSocketEventStream {
    async fn next_frame(&mut self) -> Option<SyncResult<String>> {
        loop {
            match self.socket.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.to_string())),
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "server closed connection");
                    return None;
                }
                Ok(Message::Binary(bytes)) => {
                    debug!(len = bytes.len(), "ignoring binary frame");
                }
                // Pings are answered by tungstenite on the next read.
                Ok(_) => {}
                Err(e) => return Some(Err(SyncError::ConnectionLost(e.to_string()))),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.socket.close(None).await;
    }
}

enum Scripted {
    Connect(mpsc::UnboundedReceiver<SyncResult<String>>),
    Fail(SyncError),
    Hang,
}

#[derive(Default)]
struct MockState {
    script: VecDeque<Scripted>,
    urls: Vec<String>,
}

/// A scripted connector for testing.
///
/// Each call to `connect` consumes the next scripted outcome. Once the
/// script runs out, connects fail with a retryable transport error.
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    /// Creates a connector with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a successful connection and returns its server side.
    pub fn push_connection(&self) -> MockPeer {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().script.push_back(Scripted::Connect(rx));
        MockPeer { tx }
    }

    /// Scripts a failed connection attempt.
    pub fn push_failure(&self, error: SyncError) {
        self.state.lock().script.push_back(Scripted::Fail(error));
    }

    /// Scripts a connection attempt that never completes.
    pub fn push_hang(&self) {
        self.state.lock().script.push_back(Scripted::Hang);
    }

    /// Returns the number of connection attempts made.
    pub fn attempts(&self) -> usize {
        self.state.lock().urls.len()
    }

    /// Returns the URLs passed to each attempt.
    pub fn urls(&self) -> Vec<String> {
        self.state.lock().urls.clone()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, url: &str) -> SyncResult<Box<dyn EventStream>> {
        let next = {
            let mut state = self.state.lock();
            state.urls.push(url.to_string());
            state.script.pop_front()
        };

        match next {
            Some(Scripted::Connect(rx)) => Ok(Box::new(MockEventStream { rx })),
            Some(Scripted::Fail(e)) => Err(e),
            Some(Scripted::Hang) => futures::future::pending().await,
            None => Err(SyncError::transport_retryable("no scripted connection")),
        }
    }
}

struct MockEventStream {
    rx: mpsc::UnboundedReceiver<SyncResult<String>>,
}

#[async_trait]
impl EventStream for MockEventStream {
    async fn next_frame(&mut self) -> Option<SyncResult<String>> {
        self.rx.recv().await
    }

    async fn close(&mut self) {
        self.rx.close();
    }
}

/// Server side of a scripted connection.
///
/// Dropping the peer closes the connection.
pub struct MockPeer {
    tx: mpsc::UnboundedSender<SyncResult<String>>,
}

impl MockPeer {
    /// Sends an event frame.
    pub fn send(&self, event: &SyncEvent) -> SyncResult<()> {
        self.send_raw(event.encode()?)
    }

    /// Sends a raw text frame.
    pub fn send_raw(&self, text: impl Into<String>) -> SyncResult<()> {
        self.tx
            .send(Ok(text.into()))
            .map_err(|_| SyncError::ConnectionLost("client went away".into()))
    }

    /// Fails the connection with `error`.
    pub fn fail(self, error: SyncError) {
        let _ = self.tx.send(Err(error));
    }

    /// Returns true once the client has closed its side.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_connector_follows_script() {
        let connector = MockConnector::new();
        connector.push_failure(SyncError::transport_retryable("refused"));
        let peer = connector.push_connection();

        let err = connector.connect("ws://a").await.err().unwrap();
        assert!(err.is_retryable());

        let mut stream = connector.connect("ws://b").await.unwrap();
        peer.send_raw("hello").unwrap();
        assert_eq!(stream.next_frame().await, Some(Ok("hello".to_string())));

        drop(peer);
        assert_eq!(stream.next_frame().await, None);

        assert!(connector.connect("ws://c").await.is_err());
        assert_eq!(connector.urls(), vec!["ws://a", "ws://b", "ws://c"]);
    }

    #[tokio::test]
    async fn closing_the_stream_is_visible_to_the_peer() {
        let connector = MockConnector::new();
        let peer = connector.push_connection();
        let mut stream = connector.connect("ws://x").await.unwrap();

        assert!(!peer.is_closed());
        stream.close().await;
        assert!(peer.is_closed());
        assert!(peer.send_raw("late").is_err());
    }

    #[tokio::test]
    async fn websocket_connector_rejects_non_socket_urls() {
        let err = WebSocketConnector::new()
            .connect("http://127.0.0.1:3001")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SyncError::InvalidUrl(_)));
        assert!(!err.is_retryable());
    }
}
