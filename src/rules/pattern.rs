//! Content filter patterns.
//!
//! A pattern is a tree of criteria addressed by field name. Each criterion is
//! classified once, when the rule is registered:
//!
//! ```text
//! { "source": ["acme.orders", "acme.billing"],   -> OneOf
//!   "detail-type": "OrderPlaced",                -> Literal
//!   "detail": { "status": ["OK"] } }             -> Nested { status: OneOf }
//! ```
//!
//! Top-level keys are normalized with [`field_name`] so `Source`,
//! `DetailType` and `detail-type` all address the same event field; a pattern
//! that spells one field two ways is rejected. Keys below the top level
//! belong to the event's domain payload and are kept as written.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::PatternError;
use crate::matcher::field_name;

/// One criterion inside a pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternValue {
    /// Field must equal this value exactly.
    Literal(Value),
    /// Field must equal one of these values.
    OneOf(Vec<Value>),
    /// Field must be an object matching the nested pattern.
    Nested(Pattern),
}

impl PatternValue {
    fn from_json(value: Value) -> Self {
        match value {
            Value::Array(options) => PatternValue::OneOf(options),
            Value::Object(fields) => PatternValue::Nested(Pattern::nested(fields)),
            scalar => PatternValue::Literal(scalar),
        }
    }
}

impl From<PatternValue> for Value {
    fn from(value: PatternValue) -> Self {
        match value {
            PatternValue::Literal(v) => v,
            PatternValue::OneOf(options) => Value::Array(options),
            PatternValue::Nested(pattern) => pattern.into(),
        }
    }
}

/// A rule's filter pattern.
///
/// The empty pattern places no constraint beyond the rule's event bus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Pattern {
    fields: BTreeMap<String, PatternValue>,
}

impl Pattern {
    /// Create an empty pattern.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a criterion at the top level. The key is normalized.
    pub fn with(mut self, key: &str, value: PatternValue) -> Self {
        self.fields.insert(field_name(key), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&PatternValue> {
        self.fields.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PatternValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn nested(fields: Map<String, Value>) -> Self {
        let fields = fields
            .into_iter()
            .map(|(key, value)| (key, PatternValue::from_json(value)))
            .collect();
        Self { fields }
    }

    fn top_level(fields: Map<String, Value>) -> Result<Self, PatternError> {
        let mut spelled: BTreeMap<String, String> = BTreeMap::new();
        let mut pattern = Self::new();
        for (key, value) in fields {
            let name = field_name(&key);
            match spelled.entry(name.clone()) {
                Entry::Occupied(first) => {
                    return Err(PatternError::DuplicateField {
                        field: name,
                        first: first.get().clone(),
                        second: key,
                    })
                }
                Entry::Vacant(slot) => {
                    slot.insert(key);
                }
            }
            pattern.fields.insert(name, PatternValue::from_json(value));
        }
        Ok(pattern)
    }
}

impl TryFrom<Value> for Pattern {
    type Error = PatternError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Self::top_level(fields),
            other => Err(PatternError::NotAnObject(json_kind(&other))),
        }
    }
}

impl From<Pattern> for Value {
    fn from(pattern: Pattern) -> Self {
        Value::Object(
            pattern
                .fields
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect(),
        )
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
