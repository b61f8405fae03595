//! Connection registry.

use crate::error::{ServerError, ServerResult};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// An encoded event, shared between every connection it is sent to.
pub type Frame = Arc<str>;

/// Stable identifier of a registered connection.
///
/// Ids come from a counter and are never reused, so a stale id can only
/// ever miss, never hit a newer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Returns the raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// The sending side of one live client connection.
///
/// This trait abstracts the socket so the registry and the broadcaster
/// can be exercised without a network.
pub trait EventSink: Send + Sync {
    /// Returns true if the connection can accept frames.
    fn is_open(&self) -> bool;

    /// Queues a frame without blocking.
    fn send(&self, frame: Frame) -> ServerResult<()>;
}

/// Sink backed by a bounded channel drained by the socket writer task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Frame>,
}

impl ChannelSink {
    /// Creates a sink and the receiver its writer task drains.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send(&self, frame: Frame) -> ServerResult<()> {
        self.tx.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ServerError::transport("outbound queue full"),
            mpsc::error::TrySendError::Closed(_) => ServerError::transport("connection closed"),
        })
    }
}

/// The set of connections eligible for broadcast.
///
/// Membership is a map from stable id to sink. Iteration always works on
/// a copy of the member list, so connections can come and go while a
/// broadcast is running without invalidating it.
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    members: RwLock<HashMap<ConnectionId, Arc<dyn EventSink>>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            members: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a connection and returns its id.
    pub fn register(&self, sink: Arc<dyn EventSink>) -> ConnectionId {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.members.write().insert(id, sink);
        id
    }

    /// Removes a connection.
    ///
    /// Returns false if it was not registered; removing twice is harmless.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        self.members.write().remove(&id).is_some()
    }

    /// Removes every connection, dropping their sinks.
    pub fn clear(&self) -> usize {
        let mut members = self.members.write();
        let count = members.len();
        members.clear();
        count
    }

    /// Returns the sink for a connection.
    pub fn get(&self, id: ConnectionId) -> Option<Arc<dyn EventSink>> {
        self.members.read().get(&id).cloned()
    }

    /// Returns true if the connection is registered.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members.read().contains_key(&id)
    }

    /// Returns the number of registered connections.
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Returns true if no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    /// Copies the current member list.
    pub fn members(&self) -> Vec<(ConnectionId, Arc<dyn EventSink>)> {
        let mut members: Vec<_> = self
            .members
            .read()
            .iter()
            .map(|(id, sink)| (*id, Arc::clone(sink)))
            .collect();
        members.sort_by_key(|(id, _)| *id);
        members
    }

    /// Calls `f` for every connection registered when the call starts.
    ///
    /// The lock is not held while `f` runs, so `f` may register or
    /// unregister connections.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(ConnectionId, &dyn EventSink),
    {
        for (id, sink) in self.members() {
            f(id, sink.as_ref());
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
