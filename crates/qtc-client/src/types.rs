//! Shared request options and data-store value helpers.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

// ─────────────────────────────────────────────────────────────────────────────
// Per-call options
// ─────────────────────────────────────────────────────────────────────────────

/// Options accepted by every resource-client call.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Bearer token for this call only; overrides the client secret.
    pub access_token: Option<String>,
}

impl CallOptions {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
        }
    }
}

/// Options for a custom `rest` call.
#[derive(Debug, Clone, Default)]
pub struct RestOptions {
    /// Query pairs, appended in order.
    pub query: Vec<(String, String)>,
    /// JSON body; only sent for POST and PUT.
    pub body: Option<Value>,
    pub access_token: Option<String>,
}

impl RestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Count responses
// ─────────────────────────────────────────────────────────────────────────────

/// Body of a `count=1` find.
///
/// Older server revisions answer with a bare number, newer ones with
/// `{"count": N}`; both decode here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountResponse {
    Bare(u64),
    Wrapped { count: u64 },
}

impl CountResponse {
    pub fn value(&self) -> u64 {
        match self {
            CountResponse::Bare(count) | CountResponse::Wrapped { count } => *count,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Typed data-store values
// ─────────────────────────────────────────────────────────────────────────────

/// Reference to an object in another collection.
pub fn ref_value(object_type: &str, id: &str) -> Value {
    json!({
        "$type": "ref",
        "$value": { "id": id, "objectType": object_type }
    })
}

/// Timestamp value from a UTC time string.
pub fn time_value(utc_timestamp: &str) -> Value {
    json!({ "$type": "time", "$value": utc_timestamp })
}

/// Geolocation value from `[latitude, longitude]`.
pub fn geoloc_value(lat_long: [f64; 2]) -> Value {
    json!({ "$type": "geoloc", "$value": lat_long })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_response_accepts_both_shapes() {
        let bare: CountResponse = serde_json::from_value(json!(42)).unwrap();
        let wrapped: CountResponse = serde_json::from_value(json!({"count": 42})).unwrap();
        assert_eq!(bare.value(), 42);
        assert_eq!(wrapped.value(), 42);
        assert!(serde_json::from_value::<CountResponse>(json!({"results": []})).is_err());
    }

    #[test]
    fn test_typed_values() {
        assert_eq!(
            ref_value("objects.contacts", "abc"),
            json!({"$type": "ref", "$value": {"id": "abc", "objectType": "objects.contacts"}})
        );
        assert_eq!(
            time_value("2014-01-01T00:00:00Z"),
            json!({"$type": "time", "$value": "2014-01-01T00:00:00Z"})
        );
        assert_eq!(
            geoloc_value([60.17, 24.94]),
            json!({"$type": "geoloc", "$value": [60.17, 24.94]})
        );
    }
}
