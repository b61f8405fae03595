//! Restaurant records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price range assigned to restaurants created without one.
pub const DEFAULT_PRICE_RANGE: &str = "€€";

/// Unique identifier of a restaurant.
///
/// Identifiers are assigned by the server store and never reused while
/// the process is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestaurantId(pub u64);

impl RestaurantId {
    /// Returns the raw numeric id.
    pub fn get(self) -> u64 {
        self.0
    }

    /// Returns the id following this one, or `None` at `u64::MAX`.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u64> for RestaurantId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RestaurantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single dish on a menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Dish name.
    pub name: String,
    /// Price in CHF.
    pub price: f64,
    /// Short description.
    #[serde(default)]
    pub description: String,
}

impl MenuItem {
    /// Creates a menu item.
    pub fn new(name: impl Into<String>, price: f64, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            description: description.into(),
        }
    }
}

/// A named group of menu items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuCategory {
    /// Category name (e.g. "Pizza").
    pub category: String,
    /// Items in this category.
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

impl MenuCategory {
    /// Creates a menu category.
    pub fn new(category: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            category: category.into(),
            items,
        }
    }
}

/// A restaurant as stored by the server and mirrored by clients.
///
/// Descriptive fields are fixed once the record exists. Only `is_open`
/// and `last_updated` change afterwards, and only through the server's
/// mutation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRecord {
    /// Unique id.
    pub id: RestaurantId,
    /// Display name.
    pub name: String,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Venue type (`restaurant`, `takeaway`, `cafe`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Cuisine label.
    pub cuisine: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Average rating, 0 when unrated.
    #[serde(default)]
    pub rating: f64,
    /// Price range symbol (`€` .. `€€€€`).
    #[serde(default = "default_price_range")]
    pub price_range: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone: String,
    /// Opening hours as displayed.
    #[serde(default)]
    pub hours: String,
    /// Whether the restaurant is currently open.
    pub is_open: bool,
    /// Whether delivery is offered.
    #[serde(default)]
    pub delivery: bool,
    /// Whether takeaway is offered.
    #[serde(default)]
    pub takeaway: bool,
    /// Menu, grouped by category.
    #[serde(default)]
    pub menu: Vec<MenuCategory>,
    /// Time of the last status change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Creation time, for restaurants added at runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_price_range() -> String {
    DEFAULT_PRICE_RANGE.to_string()
}

impl RestaurantRecord {
    /// Human-readable label for the price range.
    pub fn price_range_label(&self) -> &'static str {
        match self.price_range.as_str() {
            "€" => "Günstig",
            "€€" => "Mittel",
            "€€€" => "Gehoben",
            "€€€€" => "Luxus",
            _ => "Unbekannt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> RestaurantRecord {
        RestaurantRecord {
            id: RestaurantId(7),
            name: "Test".into(),
            lat: 47.0,
            lng: 8.0,
            kind: "cafe".into(),
            cuisine: "international".into(),
            description: String::new(),
            rating: 0.0,
            price_range: DEFAULT_PRICE_RANGE.into(),
            phone: String::new(),
            hours: String::new(),
            is_open: true,
            delivery: false,
            takeaway: true,
            menu: vec![MenuCategory::new(
                "Getränke",
                vec![MenuItem::new("Espresso", 3.5, "")],
            )],
            last_updated: None,
            created_at: None,
        }
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["id"], json!(7));
        assert_eq!(value["type"], json!("cafe"));
        assert_eq!(value["isOpen"], json!(true));
        assert_eq!(value["priceRange"], json!("€€"));
        assert!(value.get("lastUpdated").is_none());
        assert!(value.get("createdAt").is_none());
    }

    #[test]
    fn deserializes_minimal_record() {
        let record: RestaurantRecord = serde_json::from_value(json!({
            "id": 3,
            "name": "Burger House",
            "lat": 47.3784,
            "lng": 8.5286,
            "type": "takeaway",
            "cuisine": "amerikanisch",
            "isOpen": false,
            "lastUpdated": "2024-05-01T12:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(record.id, RestaurantId(3));
        assert!(!record.is_open);
        assert_eq!(record.price_range, DEFAULT_PRICE_RANGE);
        assert!(record.menu.is_empty());
        assert!(record.last_updated.is_some());
    }

    #[test]
    fn price_range_labels() {
        let mut record = sample();
        assert_eq!(record.price_range_label(), "Mittel");
        record.price_range = "€€€€".into();
        assert_eq!(record.price_range_label(), "Luxus");
        record.price_range = "?".into();
        assert_eq!(record.price_range_label(), "Unbekannt");
    }

    #[test]
    fn id_ordering() {
        assert!(RestaurantId(1) < RestaurantId(2));
        assert_eq!(RestaurantId(4).next(), Some(RestaurantId(5)));
        assert_eq!(RestaurantId(u64::MAX).next(), None);
        assert_eq!(RestaurantId::from(9).to_string(), "9");
    }
}
