//! # Dinemap Server
//!
//! In-memory restaurant server with live WebSocket updates.
//!
//! This crate provides:
//! - The restaurant store (single source of truth, injected, not global)
//! - A connection registry with stable handle ids
//! - A broadcast dispatcher that fans events out to every open socket
//! - Mutation endpoints that change the store and trigger broadcasts
//! - The axum router for the REST API and the socket endpoint
//!
//! # Protocol
//!
//! Clients connect to `/` (or `/ws`) and immediately receive an
//! `initial_data` snapshot. Every successful mutation is then pushed to
//! all open connections as a `status_update` or `restaurant_added`
//! event. Delivery is best effort: a connection that cannot accept a
//! frame is dropped and converges again through the snapshot it receives
//! when it reconnects.
//!
//! ```rust,ignore
//! use dinemap_server::{RestaurantServer, ServerConfig};
//!
//! let server = RestaurantServer::new(ServerConfig::default());
//! let bound = server.bind().await?;
//! println!("listening on {}", bound.local_addr());
//! bound.serve_with_shutdown(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect()
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod broadcast;
mod config;
mod error;
mod handler;
mod http;
mod registry;
mod seed;
mod server;
mod store;

pub use broadcast::Broadcaster;
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{HandlerContext, RequestHandler};
pub use http::router;
pub use registry::{ChannelSink, ConnectionId, ConnectionRegistry, EventSink, Frame};
pub use seed::demo_restaurants;
pub use server::{BoundServer, RestaurantServer, RunningServer};
pub use store::RestaurantStore;
