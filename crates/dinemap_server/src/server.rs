//! Server lifecycle: bind, serve, shut down.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::{HandlerContext, RequestHandler};
use crate::http::router;
use crate::store::RestaurantStore;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

/// The restaurant server.
///
/// # Example
///
/// ```
/// use dinemap_server::{RestaurantServer, ServerConfig};
///
/// let server = RestaurantServer::new(ServerConfig::default());
/// assert_eq!(server.handler().context().store.len(), 6);
/// assert_eq!(server.connected_clients(), 0);
/// ```
pub struct RestaurantServer {
    handler: Arc<RequestHandler>,
}

impl RestaurantServer {
    /// Creates a server with a fresh store.
    ///
    /// The store holds the demo restaurants unless
    /// `config.seed_demo_data` is false.
    pub fn new(config: ServerConfig) -> Self {
        let store = if config.seed_demo_data {
            RestaurantStore::seeded()
        } else {
            RestaurantStore::new()
        };
        Self::with_store(config, Arc::new(store))
    }

    /// Creates a server over an existing store.
    pub fn with_store(config: ServerConfig, store: Arc<RestaurantStore>) -> Self {
        let context = Arc::new(HandlerContext::new(config, store));
        let handler = Arc::new(RequestHandler::new(context));
        Self { handler }
    }

    /// Returns the request handler.
    pub fn handler(&self) -> Arc<RequestHandler> {
        Arc::clone(&self.handler)
    }

    /// Builds the router for this server.
    pub fn router(&self) -> Router {
        router(Arc::clone(&self.handler))
    }

    /// Returns the number of connected socket clients.
    pub fn connected_clients(&self) -> usize {
        self.handler.connected_clients()
    }

    /// Binds the configured address.
    pub async fn bind(self) -> ServerResult<BoundServer> {
        let listener = TcpListener::bind(self.handler.context().config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!(
            addr = %local_addr,
            restaurants = self.handler.context().store.len(),
            "server listening"
        );

        Ok(BoundServer {
            router: self.router(),
            handler: self.handler,
            listener,
            local_addr,
        })
    }
}

/// A server bound to a socket but not yet serving.
pub struct BoundServer {
    handler: Arc<RequestHandler>,
    router: Router,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl BoundServer {
    /// Returns the address actually bound (useful with port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the request handler.
    pub fn handler(&self) -> Arc<RequestHandler> {
        Arc::clone(&self.handler)
    }

    /// Serves until `signal` resolves.
    ///
    /// Open sockets are dropped from the registry when the signal fires,
    /// which closes their sessions.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handler = Arc::clone(&self.handler);
        let shutdown = async move {
            signal.await;
            info!("shutting down server");
            handler.disconnect_all();
        };

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("server closed");
        Ok(())
    }

    /// Serves on a background task.
    pub fn spawn(self) -> RunningServer {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let local_addr = self.local_addr;
        let handler = Arc::clone(&self.handler);

        let task = tokio::spawn(self.serve_with_shutdown(async move {
            let _ = stop_rx.await;
        }));

        RunningServer {
            local_addr,
            handler,
            stop_tx,
            task,
        }
    }
}

/// A server running on a background task.
pub struct RunningServer {
    local_addr: SocketAddr,
    handler: Arc<RequestHandler>,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<ServerResult<()>>,
}

impl RunningServer {
    /// Returns the bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the socket URL clients should connect to.
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.local_addr)
    }

    /// Returns the request handler.
    pub fn handler(&self) -> Arc<RequestHandler> {
        Arc::clone(&self.handler)
    }

    /// Stops the server and waits for it to finish.
    pub async fn shutdown(self) -> ServerResult<()> {
        let _ = self.stop_tx.send(());
        self.task
            .await
            .map_err(|e| ServerError::Internal(format!("server task failed: {e}")))?
    }
}
