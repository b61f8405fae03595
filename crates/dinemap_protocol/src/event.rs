//! Live-update events pushed over the socket.

use crate::error::{ProtocolError, ProtocolResult};
use crate::record::{RestaurantId, RestaurantRecord};
use serde::{Deserialize, Serialize};

/// An event sent from the server to every connected client.
///
/// On the wire each event is a JSON object `{"type": ..., "data": ...}`:
///
/// | Variant    | `type`             | `data`              |
/// |------------|--------------------|---------------------|
/// | `Snapshot` | `initial_data`     | array of records    |
/// | `Updated`  | `status_update`    | the changed record  |
/// | `Created`  | `restaurant_added` | the new record      |
///
/// Events carry no sequence number; clients apply them in arrival order
/// and the most recent state wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SyncEvent {
    /// Full replacement of the client's record set.
    #[serde(rename = "initial_data")]
    Snapshot(Vec<RestaurantRecord>),
    /// A record's status changed.
    #[serde(rename = "status_update")]
    Updated(RestaurantRecord),
    /// A record was created.
    #[serde(rename = "restaurant_added")]
    Created(RestaurantRecord),
}

/// Loose envelope used to tolerate unknown event types.
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl SyncEvent {
    /// Returns the wire `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncEvent::Snapshot(_) => "initial_data",
            SyncEvent::Updated(_) => "status_update",
            SyncEvent::Created(_) => "restaurant_added",
        }
    }

    /// Returns the id of the single record this event patches, if any.
    pub fn record_id(&self) -> Option<RestaurantId> {
        match self {
            SyncEvent::Snapshot(_) => None,
            SyncEvent::Updated(record) | SyncEvent::Created(record) => Some(record.id),
        }
    }

    /// Encodes the event as a JSON text frame.
    pub fn encode(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decodes a JSON text frame.
    ///
    /// Returns `Ok(None)` for well-formed envelopes whose `type` is not
    /// known, so newer servers can add event types without breaking
    /// older clients.
    pub fn decode(text: &str) -> ProtocolResult<Option<Self>> {
        let envelope: Envelope = serde_json::from_str(text)?;

        let event = match envelope.kind.as_str() {
            "initial_data" => SyncEvent::Snapshot(serde_json::from_value(envelope.data)?),
            "status_update" => SyncEvent::Updated(serde_json::from_value(envelope.data)?),
            "restaurant_added" => SyncEvent::Created(serde_json::from_value(envelope.data)?),
            "" => return Err(ProtocolError::invalid_structure("empty event type")),
            _ => return Ok(None),
        };

        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DEFAULT_PRICE_RANGE;
    use serde_json::{json, Value};

    fn record(id: u64, is_open: bool) -> RestaurantRecord {
        RestaurantRecord {
            id: RestaurantId(id),
            name: format!("R{id}"),
            lat: 47.0,
            lng: 8.0,
            kind: "restaurant".into(),
            cuisine: "italienisch".into(),
            description: String::new(),
            rating: 4.0,
            price_range: DEFAULT_PRICE_RANGE.into(),
            phone: String::new(),
            hours: String::new(),
            is_open,
            delivery: true,
            takeaway: true,
            menu: Vec::new(),
            last_updated: None,
            created_at: None,
        }
    }

    #[test]
    fn snapshot_wire_shape() {
        let event = SyncEvent::Snapshot(vec![record(1, true), record(2, false)]);
        let value: Value = serde_json::from_str(&event.encode().unwrap()).unwrap();

        assert_eq!(value["type"], json!("initial_data"));
        assert_eq!(value["data"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["data"][1]["isOpen"], json!(false));
    }

    #[test]
    fn update_and_create_tags() {
        let updated = SyncEvent::Updated(record(3, false));
        let created = SyncEvent::Created(record(7, true));

        assert!(updated.encode().unwrap().contains("\"type\":\"status_update\""));
        assert!(created.encode().unwrap().contains("\"type\":\"restaurant_added\""));
        assert_eq!(updated.kind(), "status_update");
        assert_eq!(created.record_id(), Some(RestaurantId(7)));
        assert_eq!(SyncEvent::Snapshot(vec![]).record_id(), None);
    }

    #[test]
    fn decode_known_event() {
        let text = json!({
            "type": "status_update",
            "data": serde_json::to_value(record(3, false)).unwrap()
        })
        .to_string();

        let event = SyncEvent::decode(&text).unwrap();
        assert_eq!(event, Some(SyncEvent::Updated(record(3, false))));
    }

    #[test]
    fn decode_unknown_type_is_ignored() {
        let text = r#"{"type":"menu_changed","data":{"id":1}}"#;
        assert_eq!(SyncEvent::decode(text).unwrap(), None);

        let text = r#"{"type":"heartbeat"}"#;
        assert_eq!(SyncEvent::decode(text).unwrap(), None);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(SyncEvent::decode("not json").is_err());
        assert!(SyncEvent::decode(r#"{"data":[]}"#).is_err());
        assert!(SyncEvent::decode(r#"{"type":"","data":[]}"#).is_err());
        assert!(SyncEvent::decode(r#"{"type":"status_update","data":{"id":1}}"#).is_err());
    }
}
