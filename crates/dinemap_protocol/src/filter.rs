//! List query predicate.

use crate::record::RestaurantRecord;
use serde::{Deserialize, Deserializer, Serialize};

/// Filter applied by `GET /restaurants` and by client-side view queries.
///
/// Every criterion is optional; an empty filter matches everything.
/// Empty strings are treated the same as absent criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantFilter {
    /// Case-insensitive substring of the cuisine.
    #[serde(default)]
    pub cuisine: Option<String>,
    /// Exact venue type.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Required delivery flag. Values other than `true`/`false` are ignored.
    #[serde(default, deserialize_with = "lenient_flag")]
    pub delivery: Option<bool>,
}

impl RestaurantFilter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the cuisine to contain `cuisine` (case-insensitive).
    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    /// Requires an exact venue type.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Requires the delivery flag to equal `delivery`.
    pub fn with_delivery(mut self, delivery: bool) -> Self {
        self.delivery = Some(delivery);
        self
    }

    /// Returns true if no criterion is set.
    pub fn is_empty(&self) -> bool {
        non_empty(&self.cuisine).is_none()
            && non_empty(&self.kind).is_none()
            && self.delivery.is_none()
    }

    /// Returns true if `record` satisfies every criterion.
    pub fn matches(&self, record: &RestaurantRecord) -> bool {
        if let Some(cuisine) = non_empty(&self.cuisine) {
            if !record
                .cuisine
                .to_lowercase()
                .contains(&cuisine.to_lowercase())
            {
                return false;
            }
        }

        if let Some(kind) = non_empty(&self.kind) {
            if record.kind != kind {
                return false;
            }
        }

        match self.delivery {
            Some(delivery) => record.delivery == delivery,
            None => true,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

// Query strings carry text, JSON carries booleans; anything else is no filter.
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(value)) => Some(value),
        Some(Flag::Text(text)) => match text.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        None => None,
    };
    Ok(flag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RestaurantId, DEFAULT_PRICE_RANGE};

    fn record(cuisine: &str, kind: &str, delivery: bool) -> RestaurantRecord {
        RestaurantRecord {
            id: RestaurantId(1),
            name: "R".into(),
            lat: 0.0,
            lng: 0.0,
            kind: kind.into(),
            cuisine: cuisine.into(),
            description: String::new(),
            rating: 0.0,
            price_range: DEFAULT_PRICE_RANGE.into(),
            phone: String::new(),
            hours: String::new(),
            is_open: true,
            delivery,
            takeaway: false,
            menu: Vec::new(),
            last_updated: None,
            created_at: None,
        }
    }

    #[test]
    fn empty_filter_matches_all() {
        let filter = RestaurantFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&record("japanisch", "restaurant", false)));

        let blank = RestaurantFilter::new().with_cuisine("").with_kind("");
        assert!(blank.is_empty());
        assert!(blank.matches(&record("japanisch", "restaurant", false)));
    }

    #[test]
    fn cuisine_is_case_insensitive_substring() {
        let filter = RestaurantFilter::new().with_cuisine("ITAL");
        assert!(filter.matches(&record("italienisch", "restaurant", true)));
        assert!(!filter.matches(&record("thailändisch", "restaurant", true)));
    }

    #[test]
    fn kind_is_exact() {
        let filter = RestaurantFilter::new().with_kind("cafe");
        assert!(filter.matches(&record("international", "cafe", false)));
        assert!(!filter.matches(&record("international", "Cafe", false)));
        assert!(!filter.matches(&record("international", "cafeteria", false)));
    }

    #[test]
    fn delivery_is_boolean_equality() {
        let wants = RestaurantFilter::new().with_delivery(true);
        let refuses = RestaurantFilter::new().with_delivery(false);
        let delivers = record("türkisch", "takeaway", true);
        let no_delivery = record("international", "cafe", false);

        assert!(wants.matches(&delivers));
        assert!(!wants.matches(&no_delivery));
        assert!(refuses.matches(&no_delivery));
        assert!(!refuses.matches(&delivers));
    }

    #[test]
    fn unusable_delivery_values_mean_no_filter() {
        let parse = |json: &str| serde_json::from_str::<RestaurantFilter>(json).unwrap();

        assert_eq!(parse(r#"{"delivery":""}"#).delivery, None);
        assert_eq!(parse(r#"{"delivery":"yes"}"#).delivery, None);
        assert_eq!(parse(r#"{"delivery":null}"#).delivery, None);
        assert_eq!(parse(r#"{"delivery":"false"}"#).delivery, Some(false));
        assert_eq!(parse(r#"{"delivery":true}"#).delivery, Some(true));
        assert!(parse(r#"{"delivery":"","cuisine":""}"#).is_empty());
    }

    #[test]
    fn criteria_combine() {
        let filter = RestaurantFilter::new()
            .with_cuisine("türk")
            .with_kind("takeaway")
            .with_delivery(true);
        assert!(filter.matches(&record("türkisch", "takeaway", true)));
        assert!(!filter.matches(&record("türkisch", "restaurant", true)));
    }
}
