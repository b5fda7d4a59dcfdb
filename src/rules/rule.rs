//! Registered rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pattern::Pattern;

/// Opaque rule identifier, generated at registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RuleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A filter bound to a handler.
///
/// Serialized the way the subscriptions listing reports it:
///
/// ```json
/// { "id": "…", "function": "notify", "endpoint": "http://localhost:3002",
///   "lambdaPort": 3002, "eventBus": "marketing",
///   "pattern": { "source": ["acme.campaign"] } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    /// Handler (function) name. Reported with every invocation result.
    #[serde(rename = "function")]
    pub handler_name: String,
    /// Base URL of the handler, e.g. `http://localhost:3002`.
    #[serde(rename = "endpoint")]
    pub handler_endpoint: String,
    /// Port the subscription supplied; absent for rules registered with a
    /// full endpoint.
    #[serde(rename = "lambdaPort", default, skip_serializing_if = "Option::is_none")]
    pub lambda_port: Option<u16>,
    /// Bus the rule listens on.
    #[serde(rename = "eventBus")]
    pub event_bus_name: String,
    #[serde(default)]
    pub pattern: Pattern,
}

/// A rule that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRule {
    pub handler_name: String,
    pub handler_endpoint: String,
    pub lambda_port: Option<u16>,
    pub event_bus_name: String,
    pub pattern: Pattern,
}

impl NewRule {
    /// A rule with an empty pattern: it fires for every event on `event_bus_name`.
    pub fn new(
        handler_name: impl Into<String>,
        handler_endpoint: impl Into<String>,
        event_bus_name: impl Into<String>,
    ) -> Self {
        Self {
            handler_name: handler_name.into(),
            handler_endpoint: handler_endpoint.into(),
            lambda_port: None,
            event_bus_name: event_bus_name.into(),
            pattern: Pattern::new(),
        }
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_lambda_port(mut self, port: u16) -> Self {
        self.lambda_port = Some(port);
        self
    }

    pub(crate) fn into_rule(self, id: RuleId) -> Rule {
        Rule {
            id,
            handler_name: self.handler_name,
            handler_endpoint: self.handler_endpoint,
            lambda_port: self.lambda_port,
            event_bus_name: self.event_bus_name,
            pattern: self.pattern,
        }
    }
}
