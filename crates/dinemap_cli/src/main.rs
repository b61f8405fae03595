//! Dinemap CLI
//!
//! Runs the restaurant server and follows its live updates.
//!
//! # Commands
//!
//! - `serve` - Run the REST API and socket endpoint
//! - `watch` - Connect to a server and log its live updates

mod commands;

use clap::{Parser, Subcommand};
use std::net::IpAddr;
use tracing_subscriber::EnvFilter;

/// Restaurant finder server and live-update watcher.
#[derive(Parser)]
#[command(name = "dinemap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 3001)]
        port: u16,

        /// Start with an empty store instead of the demo restaurants
        #[arg(long)]
        no_seed: bool,

        /// Outbound frames buffered per connection before it is dropped
        #[arg(long, default_value_t = 64)]
        buffer: usize,
    },

    /// Follow a server's live updates
    Watch {
        /// Socket URL of the server
        #[arg(short, long, env = "DINEMAP_URL", default_value = "ws://127.0.0.1:3001/ws")]
        url: String,

        /// Only report restaurants whose cuisine contains this text
        #[arg(long)]
        cuisine: Option<String>,

        /// Only report restaurants of this type
        #[arg(long = "type")]
        kind: Option<String>,

        /// Only report restaurants with this delivery flag
        #[arg(long)]
        delivery: Option<bool>,

        /// Fixed reconnect delay in seconds instead of exponential backoff
        #[arg(long)]
        fixed_delay: Option<u64>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            no_seed,
            buffer,
        } => {
            commands::serve::run(host, port, !no_seed, buffer).await?;
        }
        Commands::Watch {
            url,
            cuisine,
            kind,
            delivery,
            fixed_delay,
            format,
        } => {
            let options = commands::watch::WatchOptions {
                url,
                cuisine,
                kind,
                delivery,
                fixed_delay,
                json: commands::watch::parse_format(&format)?,
            };
            commands::watch::run(options).await?;
        }
    }

    Ok(())
}
