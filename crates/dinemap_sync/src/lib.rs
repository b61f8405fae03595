//! # Dinemap Sync
//!
//! Live-update client for the dinemap restaurant server.
//!
//! This crate provides:
//! - A client view of the restaurant set, patched by server events
//! - A connection state machine (disconnected → connecting → connected)
//! - Reconnection with bounded exponential backoff and jitter
//! - A transport abstraction with a WebSocket implementation and a
//!   scripted mock for tests
//!
//! ## Model
//!
//! On every connection the server sends a full snapshot, then one event
//! per mutation. The view replaces itself on a snapshot and upserts on
//! every other event, so a reconnect always converges on the server's
//! state without client-side deduplication.
//!
//! ## Key Invariants
//!
//! - At most one connection attempt is in flight per agent
//! - Each connection loss schedules exactly one reconnect
//! - Unknown or malformed frames are logged and never end a connection
//! - A stopped agent makes no further connection attempts

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod agent;
mod config;
mod error;
mod state;
mod transport;
mod view;

pub use agent::SyncAgent;
pub use config::{AgentConfig, ReconnectConfig};
pub use error::{SyncError, SyncResult};
pub use state::{AgentStats, ConnectionState};
pub use transport::{Connector, EventStream, MockConnector, MockPeer, WebSocketConnector};
pub use view::{ClientView, ViewChange};
