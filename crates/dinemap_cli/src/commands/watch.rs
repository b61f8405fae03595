//! Watch command implementation.

use dinemap_protocol::{RestaurantFilter, RestaurantRecord};
use dinemap_sync::{AgentConfig, ConnectionState, ReconnectConfig, SyncAgent, WebSocketConnector};
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

/// Options for the watch command.
pub struct WatchOptions {
    /// Socket URL of the server.
    pub url: String,
    /// Cuisine filter.
    pub cuisine: Option<String>,
    /// Venue type filter.
    pub kind: Option<String>,
    /// Delivery filter.
    pub delivery: Option<bool>,
    /// Fixed reconnect delay in seconds.
    pub fixed_delay: Option<u64>,
    /// Print JSON lines instead of text.
    pub json: bool,
}

/// One report line, printed whenever the view changes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewReport {
    /// Connection state.
    pub state: String,
    /// Restaurants in the view.
    pub total: usize,
    /// Restaurants matching the filter.
    pub matching: usize,
    /// Matching restaurants that are open.
    pub open: usize,
    /// The matching restaurants (JSON output only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub restaurants: Vec<RestaurantRecord>,
}

/// Parses the `--format` argument; returns true for JSON.
pub fn parse_format(format: &str) -> Result<bool, Box<dyn std::error::Error>> {
    match format {
        "text" => Ok(false),
        "json" => Ok(true),
        other => Err(format!("unknown output format: {other}").into()),
    }
}

fn build_filter(options: &WatchOptions) -> RestaurantFilter {
    let mut filter = RestaurantFilter::new();
    if let Some(cuisine) = &options.cuisine {
        filter = filter.with_cuisine(cuisine.clone());
    }
    if let Some(kind) = &options.kind {
        filter = filter.with_kind(kind.clone());
    }
    if let Some(delivery) = options.delivery {
        filter = filter.with_delivery(delivery);
    }
    filter
}

fn report(agent: &SyncAgent, filter: &RestaurantFilter, json: bool) -> ViewReport {
    let matching = agent.query(filter);
    ViewReport {
        state: agent.state().to_string(),
        total: agent.view().len(),
        matching: matching.len(),
        open: matching.iter().filter(|r| r.is_open).count(),
        restaurants: if json { matching } else { Vec::new() },
    }
}

fn print_report(report: &ViewReport, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(report)?);
    } else {
        println!(
            "[{}] {} restaurants, {} matching, {} open",
            report.state, report.total, report.matching, report.open
        );
    }
    Ok(())
}

/// Follows the server until Ctrl-C, printing a report on every change.
pub async fn run(options: WatchOptions) -> Result<(), Box<dyn std::error::Error>> {
    let reconnect = match options.fixed_delay {
        Some(secs) => ReconnectConfig::fixed(Duration::from_secs(secs)),
        None => ReconnectConfig::default(),
    };
    let config = AgentConfig::new(options.url.clone()).with_reconnect(reconnect);
    let filter = build_filter(&options);

    let agent = SyncAgent::start(config, WebSocketConnector::new());
    let mut changes = agent.subscribe();

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!(error = %e, "failed to listen for ctrl-c");
                }
                break;
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                if agent.state() != ConnectionState::Connecting {
                    print_report(&report(&agent, &filter, options.json), options.json)?;
                }
            }
            _ = tokio::time::sleep(Duration::from_secs(1)) => {}
        }

        if agent.is_finished() {
            warn!(url = %options.url, "agent stopped, exiting");
            break;
        }
    }

    let stats = agent.stats();
    agent.shutdown().await;
    println!(
        "Stopped after {} connections, {} events applied, {} frames ignored",
        stats.connections, stats.events_applied, stats.frames_ignored
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> WatchOptions {
        WatchOptions {
            url: "ws://127.0.0.1:3001/ws".into(),
            cuisine: None,
            kind: None,
            delivery: None,
            fixed_delay: None,
            json: false,
        }
    }

    #[test]
    fn format_parsing() {
        assert!(!parse_format("text").unwrap());
        assert!(parse_format("json").unwrap());
        assert!(parse_format("yaml").is_err());
    }

    #[test]
    fn filter_from_options() {
        assert!(build_filter(&options()).is_empty());

        let filter = build_filter(&WatchOptions {
            cuisine: Some("thai".into()),
            delivery: Some(false),
            ..options()
        });
        assert_eq!(
            filter,
            RestaurantFilter::new().with_cuisine("thai").with_delivery(false)
        );
    }
}
