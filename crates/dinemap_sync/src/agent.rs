//! The sync agent: follows the server and keeps a local view current.

use crate::config::AgentConfig;
use crate::error::SyncError;
use crate::state::{AgentStats, ConnectionState};
use crate::transport::{Connector, EventStream};
use crate::view::ClientView;
use dinemap_protocol::{RestaurantFilter, RestaurantId, RestaurantRecord, SyncEvent};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// State shared between the agent handle and its background task.
struct Shared {
    state: RwLock<ConnectionState>,
    stats: RwLock<AgentStats>,
    view: RwLock<ClientView>,
    generation: watch::Sender<u64>,
}

impl Shared {
    fn new() -> Self {
        let (generation, _) = watch::channel(0);
        Self {
            state: RwLock::new(ConnectionState::Disconnected),
            stats: RwLock::new(AgentStats::default()),
            view: RwLock::new(ClientView::new()),
            generation,
        }
    }

    fn notify(&self) {
        self.generation.send_modify(|g| *g += 1);
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = std::mem::replace(&mut *self.state.write(), state);
        if previous != state {
            debug!(from = %previous, to = %state, "connection state changed");
            self.notify();
        }
    }

    fn record_error(&self, error: &SyncError) {
        self.stats.write().last_error = Some(error.to_string());
    }

    fn apply_frame(&self, text: &str) {
        match SyncEvent::decode(text) {
            Ok(Some(event)) => {
                let kind = event.kind();
                let change = self.view.write().apply(event);
                debug!(kind, ?change, "applied event");
                {
                    let mut stats = self.stats.write();
                    stats.events_applied += 1;
                    stats.last_event_time = Some(Instant::now());
                }
                self.notify();
            }
            Ok(None) => {
                debug!("ignoring event of unknown type");
                self.stats.write().frames_ignored += 1;
            }
            Err(e) => {
                warn!(error = %e, "ignoring malformed frame");
                self.stats.write().frames_ignored += 1;
            }
        }
    }
}

/// Follows a server's live updates and mirrors them into a [`ClientView`].
///
/// A single background task owns the connection, so at most one connection
/// attempt is in flight and each loss schedules exactly one reconnect.
/// The attempt counter resets once a connection is established.
///
/// Stopping (or dropping) the agent closes any open connection, aborts an
/// in-flight connect and suppresses pending reconnects.
///
/// # Example
///
/// ```no_run
/// use dinemap_sync::{AgentConfig, SyncAgent, WebSocketConnector};
///
/// # async fn example() {
/// let agent = SyncAgent::start(
///     AgentConfig::new("ws://127.0.0.1:3001/ws"),
///     WebSocketConnector::new(),
/// );
///
/// let mut changes = agent.subscribe();
/// while changes.changed().await.is_ok() {
///     println!("{} restaurants", agent.records().len());
/// }
/// # }
/// ```
pub struct SyncAgent {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SyncAgent {
    /// Starts an agent on the current tokio runtime.
    pub fn start<C: Connector>(config: AgentConfig, connector: C) -> Self {
        let shared = Arc::new(Shared::new());
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run(
            config,
            connector,
            Arc::clone(&shared),
            cancel.clone(),
        ));

        Self {
            shared,
            cancel,
            task: Some(task),
        }
    }

    /// Requests the agent to stop. Returns immediately.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stops the agent and waits for its task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "agent task failed");
            }
        }
    }

    /// Returns true once the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Gets the current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.read()
    }

    /// Gets the current stats.
    pub fn stats(&self) -> AgentStats {
        self.shared.stats.read().clone()
    }

    /// Returns a receiver notified whenever the view or the connection
    /// state changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.generation.subscribe()
    }

    /// Returns a copy of the view.
    pub fn view(&self) -> ClientView {
        self.shared.view.read().clone()
    }

    /// Returns one record from the view.
    pub fn get(&self, id: RestaurantId) -> Option<RestaurantRecord> {
        self.shared.view.read().get(id).cloned()
    }

    /// Returns every record in the view.
    pub fn records(&self) -> Vec<RestaurantRecord> {
        self.shared.view.read().records()
    }

    /// Returns the records in the view matching `filter`.
    pub fn query(&self, filter: &RestaurantFilter) -> Vec<RestaurantRecord> {
        self.shared.view.read().query(filter)
    }
}

impl Drop for SyncAgent {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run<C: Connector>(
    config: AgentConfig,
    connector: C,
    shared: Arc<Shared>,
    cancel: CancellationToken,
) {
    let reconnect = &config.reconnect;
    let mut attempt: u32 = 0;

    loop {
        if attempt > 0 {
            if !reconnect.allows_attempt(attempt) {
                warn!(attempts = attempt - 1, "giving up on reconnecting");
                break;
            }

            let delay = reconnect.delay_for_attempt(attempt);
            info!(attempt, delay_ms = delay.as_millis() as u64, "reconnecting");
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
            shared.stats.write().reconnect_attempts += 1;
        }

        shared.set_state(ConnectionState::Connecting);
        let connected = tokio::select! {
            _ = cancel.cancelled() => break,
            result = connector.connect(&config.url) => result,
        };

        let mut stream = match connected {
            Ok(stream) => stream,
            Err(e) => {
                shared.record_error(&e);
                shared.set_state(ConnectionState::Disconnected);
                if !e.is_retryable() {
                    warn!(url = %config.url, error = %e, "connection failed, not retrying");
                    break;
                }
                debug!(url = %config.url, error = %e, "connection attempt failed");
                attempt = attempt.saturating_add(1);
                continue;
            }
        };

        attempt = 0;
        shared.stats.write().connections += 1;
        shared.set_state(ConnectionState::Connected);
        info!(url = %config.url, "connected");

        let reason = follow(stream.as_mut(), &shared, &cancel).await;
        shared.set_state(ConnectionState::Disconnected);

        if reason == SyncError::Cancelled {
            stream.close().await;
            break;
        }

        shared.record_error(&reason);
        if !reason.is_retryable() {
            warn!(error = %reason, "connection ended, not retrying");
            break;
        }
        info!(error = %reason, "disconnected");
        attempt = 1;
    }

    shared.set_state(ConnectionState::Disconnected);
    info!("sync agent stopped");
}

/// Applies frames until the connection ends; returns why it ended.
async fn follow(
    stream: &mut dyn EventStream,
    shared: &Shared,
    cancel: &CancellationToken,
) -> SyncError {
    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => return SyncError::Cancelled,
            frame = stream.next_frame() => frame,
        };

        match frame {
            Some(Ok(text)) => shared.apply_frame(&text),
            Some(Err(e)) => return e,
            None => return SyncError::ConnectionLost("server closed the connection".into()),
        }
    }
}
