use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Bus targeted by entries that do not name one.
pub const DEFAULT_EVENT_BUS: &str = "default";

/// One entry of a `PutEvents` request.
///
/// The well-known fields are typed; everything else (`Time`, `Resources`,
/// `TraceHeader`, …) is kept in `extra` and forwarded to handlers untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutEventsEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_type: Option<String>,
    /// Usually a JSON-encoded string; an inline object is accepted as well.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_bus_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PutEventsEntry {
    pub fn new(source: impl Into<String>, detail_type: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            detail_type: Some(detail_type.into()),
            ..Self::default()
        }
    }

    /// Set `Detail` to the JSON encoding of `detail`.
    pub fn with_detail(mut self, detail: &Value) -> Self {
        self.detail = Some(Value::String(detail.to_string()));
        self
    }

    pub fn on_bus(mut self, event_bus_name: impl Into<String>) -> Self {
        self.event_bus_name = Some(event_bus_name.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// The bus this entry is published to.
    pub fn bus(&self) -> &str {
        self.event_bus_name.as_deref().unwrap_or(DEFAULT_EVENT_BUS)
    }

    /// The entry as a JSON object, with publish-side (PascalCase) field names.
    ///
    /// This is the payload handlers receive.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(source) = &self.source {
            fields.insert("Source".into(), Value::String(source.clone()));
        }
        if let Some(detail_type) = &self.detail_type {
            fields.insert("DetailType".into(), Value::String(detail_type.clone()));
        }
        if let Some(detail) = &self.detail {
            fields.insert("Detail".into(), detail.clone());
        }
        if let Some(bus) = &self.event_bus_name {
            fields.insert("EventBusName".into(), Value::String(bus.clone()));
        }
        for (key, value) in &self.extra {
            fields.insert(key.clone(), value.clone());
        }
        fields
    }
}
