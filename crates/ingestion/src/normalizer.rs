//! Webhook payload normalization
//!
//! Turns a raw PokemonGo-Map webhook body (`{"type": ..., "message": {...}}`)
//! into an [`Event`]. Anything that is not a recognized, identifiable event
//! yields `None`; that is not an error.

use contracts::{Event, EventKind, RawPayload};
use serde_json::{Map, Value};
use tracing::debug;

/// Payload types that are known but carry nothing to dispatch
const IGNORED_TYPES: &[&str] = &["captcha", "scheduler"];

/// Stateless payload normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct EventNormalizer;

impl EventNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize one payload
    ///
    /// Returns `None` for unrecognized or incomplete payloads.
    pub fn normalize(&self, payload: &RawPayload) -> Option<Event> {
        let Some(kind) = payload.get("type").and_then(Value::as_str) else {
            debug!("payload has no type field, ignoring");
            return None;
        };
        let Some(message) = payload.get("message").and_then(Value::as_object) else {
            debug!(kind, "payload has no message object, ignoring");
            return None;
        };

        match kind {
            "pokemon" => Self::pokemon(message),
            "pokestop" => Self::pokestop(message),
            "gym" => Self::gym(message, "gym_id"),
            "gym_details" => Self::gym(message, "id"),
            ignored if IGNORED_TYPES.contains(&ignored) => None,
            other => {
                debug!(kind = other, "unrecognized payload type");
                None
            }
        }
    }

    fn pokemon(message: &Map<String, Value>) -> Option<Event> {
        if matches!(message.get("pokemon_id"), None | Some(Value::Null)) {
            debug!("pokemon payload without pokemon_id, ignoring");
            return None;
        }
        Self::build(EventKind::Pokemon, message, "encounter_id")
    }

    fn pokestop(message: &Map<String, Value>) -> Option<Event> {
        // Only lured stops are interesting.
        if matches!(message.get("lure_expiration"), None | Some(Value::Null)) {
            return None;
        }
        Self::build(EventKind::Pokestop, message, "pokestop_id")
    }

    fn gym(message: &Map<String, Value>, id_key: &str) -> Option<Event> {
        Self::build(EventKind::Gym, message, id_key)
    }

    fn build(kind: EventKind, message: &Map<String, Value>, id_key: &str) -> Option<Event> {
        let Some(id) = message.get(id_key).and_then(identifier) else {
            debug!(%kind, id_key, "payload without identifier, ignoring");
            return None;
        };

        let mut fields = message.clone();
        fields.remove(id_key);
        Some(Event { kind, id, fields })
    }
}

/// Ids arrive as strings or as bare numbers depending on the scanner
fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
