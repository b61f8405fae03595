//! Request handlers for the restaurant endpoints.

use crate::broadcast::Broadcaster;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::registry::{ConnectionId, ConnectionRegistry, EventSink, Frame};
use crate::store::RestaurantStore;
use dinemap_protocol::{
    HealthResponse, MenuResponse, RestaurantDraft, RestaurantFilter, RestaurantId,
    RestaurantRecord, SyncEvent,
};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// State shared by every request.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// Restaurant store (shared across all handlers).
    pub store: Arc<RestaurantStore>,
    /// Open socket connections.
    pub registry: Arc<ConnectionRegistry>,
    /// Serializes mutate-then-broadcast so events leave in commit order.
    mutations: Mutex<()>,
}

impl HandlerContext {
    /// Creates a new handler context.
    pub fn new(config: ServerConfig, store: Arc<RestaurantStore>) -> Self {
        Self {
            config,
            store,
            registry: Arc::new(ConnectionRegistry::new()),
            mutations: Mutex::new(()),
        }
    }
}

/// Handler for restaurant requests and socket sessions.
pub struct RequestHandler {
    context: Arc<HandlerContext>,
    broadcaster: Broadcaster,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        let broadcaster = Broadcaster::new(Arc::clone(&context.registry));
        Self {
            context,
            broadcaster,
        }
    }

    /// Returns the shared context.
    pub fn context(&self) -> &Arc<HandlerContext> {
        &self.context
    }

    /// Lists restaurants matching `filter`.
    pub fn list(&self, filter: &RestaurantFilter) -> Vec<RestaurantRecord> {
        self.context.store.list(|r| filter.matches(r))
    }

    /// Gets one restaurant.
    pub fn get(&self, id: RestaurantId) -> ServerResult<RestaurantRecord> {
        self.context.store.get(id)
    }

    /// Gets a restaurant's menu.
    pub fn menu(&self, id: RestaurantId) -> ServerResult<MenuResponse> {
        self.context
            .store
            .get(id)
            .map(|record| MenuResponse::from(&record))
    }

    /// Reports liveness and the number of connected clients.
    pub fn health(&self) -> HealthResponse {
        HealthResponse::ok(self.context.registry.len())
    }

    /// Handles a status change request body (`{"isOpen": bool}`).
    ///
    /// Unknown ids fail with `NotFound` before the body is looked at;
    /// anything but a JSON boolean `isOpen` is an invalid argument.
    pub fn set_open_status(&self, id: RestaurantId, body: &Value) -> ServerResult<RestaurantRecord> {
        if !self.context.store.contains(id) {
            return Err(ServerError::NotFound(id));
        }

        let is_open = body
            .get("isOpen")
            .and_then(Value::as_bool)
            .ok_or_else(|| ServerError::invalid_argument("isOpen must be a boolean"))?;

        self.set_open(id, is_open)
    }

    /// Sets a restaurant's open status and broadcasts the updated record.
    pub fn set_open(&self, id: RestaurantId, is_open: bool) -> ServerResult<RestaurantRecord> {
        let _guard = self.context.mutations.lock();
        let record = self.context.store.upsert_status(id, is_open)?;
        info!(restaurant = %id, is_open, "status updated");

        self.broadcaster.broadcast(&SyncEvent::Updated(record.clone()));
        Ok(record)
    }

    /// Handles a create request body.
    pub fn create_restaurant(&self, body: Value) -> ServerResult<RestaurantRecord> {
        let draft = RestaurantDraft::from_json(body)?;
        self.create(draft)
    }

    /// Creates a restaurant and broadcasts it.
    ///
    /// A rejected draft neither touches the store nor broadcasts.
    pub fn create(&self, draft: RestaurantDraft) -> ServerResult<RestaurantRecord> {
        let _guard = self.context.mutations.lock();
        let record = self.context.store.insert(draft)?;
        info!(restaurant = %record.id, name = %record.name, "restaurant created");

        self.broadcaster.broadcast(&SyncEvent::Created(record.clone()));
        Ok(record)
    }

    /// Registers a connection and sends it the current snapshot.
    ///
    /// The snapshot is queued while the store's read lock is held, so no
    /// update committed after it can be queued ahead of it.
    pub fn attach(&self, sink: Arc<dyn EventSink>) -> ServerResult<ConnectionId> {
        let registry = &self.context.registry;
        let id = registry.register(Arc::clone(&sink));

        let sent = self.context.store.with_snapshot(|records| {
            let frame: Frame = Arc::from(SyncEvent::Snapshot(records.to_vec()).encode()?);
            sink.send(frame)
        });

        if let Err(e) = sent {
            registry.unregister(id);
            return Err(e);
        }

        info!(connection = %id, clients = registry.len(), "client connected");
        Ok(id)
    }

    /// Removes a connection. Safe to call more than once.
    pub fn detach(&self, id: ConnectionId) -> bool {
        let removed = self.context.registry.unregister(id);
        if removed {
            info!(connection = %id, clients = self.context.registry.len(), "client disconnected");
        } else {
            debug!(connection = %id, "connection already removed");
        }
        removed
    }

    /// Drops every connection; their sessions close on their own.
    pub fn disconnect_all(&self) -> usize {
        let count = self.context.registry.clear();
        if count > 0 {
            info!(count, "disconnected all clients");
        }
        count
    }

    /// Returns the number of connected clients.
    pub fn connected_clients(&self) -> usize {
        self.context.registry.len()
    }
}
