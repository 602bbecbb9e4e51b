//! Event - Normalizer output
//!
//! Raw webhook payloads and the canonical event handed to managers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Parsed webhook body as it travels through the ingestion queue
pub type RawPayload = Value;

/// Recognized event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Wild pokemon sighting
    Pokemon,
    /// Lured pokestop
    Pokestop,
    /// Gym state
    Gym,
}

impl EventKind {
    /// Stable lowercase name (used for logs/metrics labels)
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Pokemon => "pokemon",
            EventKind::Pokestop => "pokestop",
            EventKind::Gym => "gym",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized event
///
/// Always carries a unique identifier; everything else from the webhook
/// message is kept in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event kind
    pub kind: EventKind,

    /// Unique identifier (encounter id, pokestop id, gym id)
    pub id: String,

    /// Remaining message fields
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Event {
    /// Create an event with no extra fields
    pub fn new(kind: EventKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field insertion
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Look up a field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Look up an integer field (accepts numbers and numeric strings)
    pub fn field_i64(&self, key: &str) -> Option<i64> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_i64_accepts_numeric_strings() {
        let event = Event::new(EventKind::Pokemon, "abc")
            .with_field("disappear_time", json!(1500000000))
            .with_field("pokemon_id", json!("16"))
            .with_field("latitude", json!(37.5));

        assert_eq!(event.field_i64("disappear_time"), Some(1500000000));
        assert_eq!(event.field_i64("pokemon_id"), Some(16));
        assert_eq!(event.field_i64("latitude"), Some(37));
        assert_eq!(event.field_i64("missing"), None);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&EventKind::Pokestop).unwrap();
        assert_eq!(json, "\"pokestop\"");
        assert_eq!(EventKind::Gym.to_string(), "gym");
    }
}
