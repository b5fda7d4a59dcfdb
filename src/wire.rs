//! HTTP body shapes shared by the server and [`BusClient`](crate::client::BusClient).

use serde::{de, Deserialize, Serialize};
use serde_json::Value;

/// `{ "status": 200, "body": … }`, used by the rule listing and removal routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: u16,
    pub body: T,
}

impl<T> Envelope<T> {
    pub fn ok(body: T) -> Self {
        Self { status: 200, body }
    }
}

/// Body of a publish call. Entries stay raw so one malformed entry does not
/// reject the whole batch. A missing `Entries` is an empty batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PutEventsRequest {
    #[serde(rename = "Entries", default)]
    pub entries: Vec<Value>,
}

impl PutEventsRequest {
    /// Parse a publish body. An empty body is an empty batch; anything that
    /// is not a JSON object, or whose `Entries` is not a list, is an error.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        match serde_json::from_slice::<Value>(body)? {
            Value::Object(fields) => serde_json::from_value(Value::Object(fields)),
            _ => Err(de::Error::custom("publish body must be a JSON object")),
        }
    }
}
