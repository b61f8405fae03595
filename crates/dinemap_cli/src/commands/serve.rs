//! Serve command implementation.

use dinemap_server::{RestaurantServer, ServerConfig};
use std::net::{IpAddr, SocketAddr};
use tracing::{info, warn};

/// Runs the server until Ctrl-C.
pub async fn run(
    host: IpAddr,
    port: u16,
    seed: bool,
    buffer: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::new(SocketAddr::new(host, port))
        .with_seed_demo_data(seed)
        .with_outbound_buffer(buffer);

    let server = RestaurantServer::new(config);
    info!(
        restaurants = server.handler().context().store.len(),
        "loaded restaurants"
    );

    let bound = server.bind().await?;
    println!("Server running on http://{}", bound.local_addr());
    println!("WebSocket endpoint: ws://{}/ws", bound.local_addr());

    bound
        .serve_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c");
            }
        })
        .await?;

    Ok(())
}
