//! Subscription requests: a function plus the `eventBridge` events it listens to.
//!
//! ```json
//! {
//!   "name": "my-service-dev-notify",
//!   "lambdaPort": 3002,
//!   "events": [
//!     { "eventBridge": { "eventBus": "marketing", "pattern": { "source": ["acme.campaign"] } } },
//!     { "http": { "path": "/notify" } }
//!   ]
//! }
//! ```
//!
//! Every event carrying an `eventBridge` key becomes one rule. Other event
//! kinds are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::RegistrationError;
use super::pattern::{json_kind, Pattern};
use super::rule::{NewRule, RuleId};
use crate::event::DEFAULT_EVENT_BUS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    /// Function name; becomes the handler name of every rule.
    pub name: String,
    /// Port of the Lambda-compatible endpoint serving the function.
    pub lambda_port: u16,
    pub events: Vec<Value>,
}

impl SubscriptionRequest {
    /// Parse a request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, RegistrationError> {
        serde_json::from_slice(body).map_err(|e| RegistrationError::MalformedRequest(e.to_string()))
    }

    /// Turn each `eventBridge` event into a rule definition.
    ///
    /// The result is aligned with the `eventBridge` events in `events`; a
    /// malformed entry yields an error in its slot without affecting the
    /// others.
    pub fn rules(&self, lambda_host: &str) -> Vec<Result<NewRule, RegistrationError>> {
        let endpoint = format!("http://{}:{}", lambda_host, self.lambda_port);
        self.events
            .iter()
            .filter_map(|event| event.get("eventBridge"))
            .filter(|config| !config.is_null())
            .map(|config| self.rule_for(config, &endpoint))
            .collect()
    }

    fn rule_for(&self, config: &Value, endpoint: &str) -> Result<NewRule, RegistrationError> {
        let Value::Object(config) = config else {
            return Err(RegistrationError::InvalidEntry(format!(
                "eventBridge must be an object, got {}",
                json_kind(config)
            )));
        };

        let event_bus = match config.get("eventBus") {
            None | Some(Value::Null) => DEFAULT_EVENT_BUS.to_string(),
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(RegistrationError::InvalidEntry(format!(
                    "eventBus must be a string, got {}",
                    json_kind(other)
                )))
            }
        };

        let pattern = match config.get("pattern") {
            None | Some(Value::Null) => Pattern::new(),
            Some(doc) => Pattern::try_from(doc.clone())?,
        };

        Ok(NewRule::new(self.name.clone(), endpoint, event_bus)
            .with_lambda_port(self.lambda_port)
            .with_pattern(pattern))
    }
}

/// Per-entry result of a subscription call, as returned over HTTP: the new
/// rule id, or the reason the entry was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegistrationOutcome {
    Registered(RuleId),
    Rejected { error: String },
}

impl RegistrationOutcome {
    pub fn rule_id(&self) -> Option<&RuleId> {
        match self {
            RegistrationOutcome::Registered(id) => Some(id),
            RegistrationOutcome::Rejected { .. } => None,
        }
    }
}

impl From<Result<RuleId, RegistrationError>> for RegistrationOutcome {
    fn from(result: Result<RuleId, RegistrationError>) -> Self {
        match result {
            Ok(id) => RegistrationOutcome::Registered(id),
            Err(e) => RegistrationOutcome::Rejected {
                error: e.to_string(),
            },
        }
    }
}
