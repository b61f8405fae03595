//! HTTP response bodies.

use crate::record::{MenuCategory, RestaurantRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `GET /restaurants/{id}/menu`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuResponse {
    /// Name of the restaurant the menu belongs to.
    pub restaurant_name: String,
    /// The menu.
    pub menu: Vec<MenuCategory>,
}

impl From<&RestaurantRecord> for MenuResponse {
    fn from(record: &RestaurantRecord) -> Self {
        Self {
            restaurant_name: record.name.clone(),
            menu: record.menu.clone(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"` while the server answers.
    pub status: String,
    /// Server time.
    pub timestamp: DateTime<Utc>,
    /// Number of registered socket connections.
    pub connected_clients: usize,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn ok(connected_clients: usize) -> Self {
        Self {
            status: "ok".into(),
            timestamp: Utc::now(),
            connected_clients,
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

impl ErrorBody {
    /// Creates an error body.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
