//! Field-name normalization and event preparation for matching.

use serde_json::{Map, Value};

use crate::event::{PutEventsEntry, DEFAULT_EVENT_BUS};

/// Key under which the bus name is matched.
pub const EVENT_BUS_FIELD: &str = "event-bus-name";

const DETAIL_FIELD: &str = "detail";

/// Normalize a field name to lower-case, hyphen-separated form.
///
/// `DetailType` → `detail-type`, `EventBusName` → `event-bus-name`,
/// `Detail-type` → `detail-type`. Underscores become hyphens. A run of
/// capitals stays one word (`ID` → `id`).
pub fn field_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c == '_' {
            out.push('-');
        } else if c.is_uppercase() {
            if prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

/// An event as the matcher sees it: normalized top-level keys, `detail`
/// decoded into structure, and the bus name always present.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    fields: Map<String, Value>,
}

impl NormalizedEvent {
    pub fn from_entry(entry: &PutEventsEntry) -> Self {
        Self::from_fields(&entry.to_fields())
    }

    /// Normalize a raw event object, in either the publish-side PascalCase
    /// form or the hyphenated form.
    pub fn from_fields(raw: &Map<String, Value>) -> Self {
        let mut fields = Map::with_capacity(raw.len() + 1);
        for (key, value) in raw {
            let key = field_name(key);
            if key == DETAIL_FIELD {
                if let Some(detail) = decode_detail(value) {
                    fields.insert(key, detail);
                }
            } else {
                fields.insert(key, value.clone());
            }
        }
        if !fields.get(EVENT_BUS_FIELD).is_some_and(Value::is_string) {
            fields.insert(
                EVENT_BUS_FIELD.to_string(),
                Value::String(DEFAULT_EVENT_BUS.to_string()),
            );
        }
        Self { fields }
    }

    pub fn bus(&self) -> &str {
        self.fields
            .get(EVENT_BUS_FIELD)
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_EVENT_BUS)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/// Decode `detail` into a structure. A string that is not valid JSON has no
/// matchable structure and is dropped.
fn decode_detail(value: &Value) -> Option<Value> {
    match value {
        Value::String(encoded) => match serde_json::from_str(encoded) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::debug!(error = %e, "event detail is not valid JSON; ignoring it for matching");
                None
            }
        },
        Value::Null => None,
        other => Some(other.clone()),
    }
}
