//! Content-pattern matching.
//!
//! [`matches`] decides whether a rule fires for an event. It is pure and
//! total: shape mismatches between pattern and event are non-matches, never
//! errors.
//!
//! For each key in the pattern (keys the pattern does not mention are
//! unconstrained):
//!
//! | criterion              | event field must…                              |
//! |------------------------|------------------------------------------------|
//! | `Literal(v)`           | equal `v`                                      |
//! | `OneOf([v1, v2, …])`   | equal one of the values, compared as a whole   |
//! | `Nested(pattern)`      | be an object that matches `pattern` recursively|
//!
//! A missing field never matches. The rule's bus is an implicit criterion
//! that is always checked first.

mod normalize;

use serde_json::{Map, Value};

use crate::rules::{Pattern, PatternValue, Rule};

pub use normalize::{field_name, NormalizedEvent, EVENT_BUS_FIELD};

/// Does `rule` fire for `event`?
pub fn matches(rule: &Rule, event: &NormalizedEvent) -> bool {
    event.bus() == rule.event_bus_name && matches_pattern(&rule.pattern, event.fields())
}

/// Match a pattern against an object, field by field.
pub fn matches_pattern(pattern: &Pattern, fields: &Map<String, Value>) -> bool {
    pattern.iter().all(|(key, criterion)| {
        fields
            .get(key)
            .is_some_and(|value| matches_value(criterion, value))
    })
}

fn matches_value(criterion: &PatternValue, value: &Value) -> bool {
    match criterion {
        PatternValue::Literal(expected) => value == expected,
        PatternValue::OneOf(options) => options.iter().any(|option| option == value),
        PatternValue::Nested(nested) => match value {
            Value::Object(fields) => matches_pattern(nested, fields),
            _ => false,
        },
    }
}
