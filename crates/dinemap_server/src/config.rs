//! Server configuration.

use std::net::SocketAddr;

/// Configuration for the restaurant server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Frames buffered per connection before it counts as too slow.
    pub outbound_buffer: usize,
    /// Whether to allow any origin, method and header (CORS).
    pub permissive_cors: bool,
    /// Whether to load the demo restaurants on startup.
    pub seed_demo_data: bool,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            outbound_buffer: 64,
            permissive_cors: true,
            seed_demo_data: true,
        }
    }

    /// Sets the per-connection outbound buffer size.
    pub fn with_outbound_buffer(mut self, frames: usize) -> Self {
        self.outbound_buffer = frames.max(1);
        self
    }

    /// Enables or disables permissive CORS.
    pub fn with_permissive_cors(mut self, enabled: bool) -> Self {
        self.permissive_cors = enabled;
        self
    }

    /// Enables or disables loading the demo restaurants.
    pub fn with_seed_demo_data(mut self, enabled: bool) -> Self {
        self.seed_demo_data = enabled;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 3001)))
    }
}
