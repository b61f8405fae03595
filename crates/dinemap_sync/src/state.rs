//! Agent connection state and statistics.

use std::fmt;
use std::time::Instant;

/// The current connection state of a sync agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No transport. Initial state, and the state after a close or error.
    #[default]
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// Events are being received and applied.
    Connected,
}

impl ConnectionState {
    /// Returns true if the agent holds or is acquiring a transport.
    pub fn is_active(&self) -> bool {
        matches!(self, ConnectionState::Connecting | ConnectionState::Connected)
    }

    /// Returns true if a connection attempt may start from this state.
    pub fn can_connect(&self) -> bool {
        matches!(self, ConnectionState::Disconnected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        };
        f.write_str(name)
    }
}

/// Statistics about an agent's lifetime.
#[derive(Debug, Clone, Default)]
pub struct AgentStats {
    /// Connections successfully established.
    pub connections: u64,
    /// Reconnect attempts made after a loss or failed attempt.
    pub reconnect_attempts: u64,
    /// Events applied to the view.
    pub events_applied: u64,
    /// Frames logged and ignored (unknown type or malformed).
    pub frames_ignored: u64,
    /// When the last event was applied.
    pub last_event_time: Option<Instant>,
    /// Last error message.
    pub last_error: Option<String>,
}
