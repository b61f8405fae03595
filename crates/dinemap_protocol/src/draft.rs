//! Creation payload for new restaurants.

use crate::record::{MenuCategory, RestaurantId, RestaurantRecord, DEFAULT_PRICE_RANGE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a draft was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DraftError {
    /// A required field is absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field is present but unusable.
    #[error("invalid field {field}: {reason}")]
    InvalidField {
        /// Field name as it appears on the wire.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The payload is not a draft object at all.
    #[error("malformed draft: {0}")]
    Malformed(String),
}

/// Fields submitted to create a restaurant.
///
/// Every field is optional on the wire; [`RestaurantDraft::into_record`]
/// enforces the required ones (`name`, `lat`, `lng`, `type`, `cuisine`)
/// and fills defaults for the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDraft {
    /// Display name (required, non-empty).
    #[serde(default)]
    pub name: Option<String>,
    /// Latitude (required, finite).
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude (required, finite).
    #[serde(default)]
    pub lng: Option<f64>,
    /// Venue type (required, non-empty).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Cuisine (required, non-empty).
    #[serde(default)]
    pub cuisine: Option<String>,
    /// Description, empty when absent.
    #[serde(default)]
    pub description: Option<String>,
    /// Phone number, empty when absent.
    #[serde(default)]
    pub phone: Option<String>,
    /// Opening hours, empty when absent.
    #[serde(default)]
    pub hours: Option<String>,
    /// Rating, 0 when absent.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Price range symbol, `€€` when absent.
    #[serde(default)]
    pub price_range: Option<String>,
    /// Open status, open when absent.
    #[serde(default)]
    pub is_open: Option<bool>,
    /// Delivery flag, false when absent.
    #[serde(default)]
    pub delivery: Option<bool>,
    /// Takeaway flag, false when absent.
    #[serde(default)]
    pub takeaway: Option<bool>,
    /// Menu, empty when absent.
    #[serde(default)]
    pub menu: Option<Vec<MenuCategory>>,
}

impl RestaurantDraft {
    /// Creates a draft with just the required fields set.
    pub fn new(
        name: impl Into<String>,
        lat: f64,
        lng: f64,
        kind: impl Into<String>,
        cuisine: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            lat: Some(lat),
            lng: Some(lng),
            kind: Some(kind.into()),
            cuisine: Some(cuisine.into()),
            ..Self::default()
        }
    }

    /// Parses a draft from an arbitrary JSON body.
    ///
    /// Type mismatches (e.g. a string latitude) are reported as
    /// [`DraftError::Malformed`] rather than a JSON error so callers can
    /// treat every draft problem as an invalid argument.
    pub fn from_json(value: serde_json::Value) -> Result<Self, DraftError> {
        if !value.is_object() {
            return Err(DraftError::Malformed("expected a JSON object".into()));
        }
        serde_json::from_value(value).map_err(|e| DraftError::Malformed(e.to_string()))
    }

    /// Checks required fields without consuming the draft.
    pub fn validate(&self) -> Result<(), DraftError> {
        required_text(&self.name, "name")?;
        required_coordinate(self.lat, "lat")?;
        required_coordinate(self.lng, "lng")?;
        required_text(&self.kind, "type")?;
        required_text(&self.cuisine, "cuisine")?;

        if let Some(rating) = self.rating {
            if !rating.is_finite() {
                return Err(DraftError::InvalidField {
                    field: "rating",
                    reason: "must be a finite number".into(),
                });
            }
        }
        Ok(())
    }

    /// Validates the draft and builds the record it describes.
    pub fn into_record(
        self,
        id: RestaurantId,
        created_at: DateTime<Utc>,
    ) -> Result<RestaurantRecord, DraftError> {
        self.validate()?;

        Ok(RestaurantRecord {
            id,
            name: self.name.unwrap_or_default(),
            lat: self.lat.unwrap_or_default(),
            lng: self.lng.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            cuisine: self.cuisine.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            rating: self.rating.unwrap_or(0.0),
            price_range: self
                .price_range
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PRICE_RANGE.to_string()),
            phone: self.phone.unwrap_or_default(),
            hours: self.hours.unwrap_or_default(),
            is_open: self.is_open.unwrap_or(true),
            delivery: self.delivery.unwrap_or(false),
            takeaway: self.takeaway.unwrap_or(false),
            menu: self.menu.unwrap_or_default(),
            last_updated: None,
            created_at: Some(created_at),
        })
    }
}

fn required_text(value: &Option<String>, field: &'static str) -> Result<(), DraftError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(()),
        _ => Err(DraftError::MissingField(field)),
    }
}

fn required_coordinate(value: Option<f64>, field: &'static str) -> Result<(), DraftError> {
    match value {
        Some(v) if v.is_finite() => Ok(()),
        Some(_) => Err(DraftError::InvalidField {
            field,
            reason: "must be a finite number".into(),
        }),
        None => Err(DraftError::MissingField(field)),
    }
}
