//! Delivery reports returned from a publish call.
//!
//! ```json
//! {
//!   "Entries": [
//!     { "EventId": "…", "triggeredInvocations": [{ "body": {…}, "function": "notify" }] },
//!     { "EventId": "…", "triggeredInvocations": [],
//!       "failedInvocations": [{ "function": "audit", "error": "transport error: …" }],
//!       "ErrorCode": "InvocationFailed", "ErrorMessage": "0 of 1 handlers succeeded" }
//!   ],
//!   "FailedEntryCount": 1
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `ErrorCode` of an entry that could not be read as an event.
pub const MALFORMED_ENTRY: &str = "MalformedEntry";
/// `ErrorCode` of an entry whose every matched handler failed.
pub const INVOCATION_FAILED: &str = "InvocationFailed";

/// A handler's response to one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub body: Value,
    pub function: String,
}

/// A handler call that did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedInvocation {
    pub function: String,
    pub error: String,
}

/// Outcome of one published entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryOutcome {
    #[serde(rename = "EventId")]
    pub event_id: String,
    #[serde(rename = "triggeredInvocations", default)]
    pub triggered_invocations: Vec<Invocation>,
    #[serde(
        rename = "failedInvocations",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub failed_invocations: Vec<FailedInvocation>,
    #[serde(rename = "ErrorCode", default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(
        rename = "ErrorMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,
}

impl EntryOutcome {
    /// Build the outcome of a delivered entry.
    ///
    /// The entry fails only when it matched at least one rule and none of
    /// the handlers succeeded. Matching nothing is a successful delivery,
    /// and so is a partial one.
    pub fn delivered(
        event_id: String,
        triggered_invocations: Vec<Invocation>,
        failed_invocations: Vec<FailedInvocation>,
    ) -> Self {
        let (error_code, error_message) =
            if triggered_invocations.is_empty() && !failed_invocations.is_empty() {
                (
                    Some(INVOCATION_FAILED.to_string()),
                    Some(format!(
                        "0 of {} handlers succeeded",
                        failed_invocations.len()
                    )),
                )
            } else {
                (None, None)
            };
        Self {
            event_id,
            triggered_invocations,
            failed_invocations,
            error_code,
            error_message,
        }
    }

    /// Outcome of an entry that could not be decoded.
    pub fn malformed(event_id: String, reason: impl Into<String>) -> Self {
        Self {
            event_id,
            triggered_invocations: Vec::new(),
            failed_invocations: Vec::new(),
            error_code: Some(MALFORMED_ENTRY.to_string()),
            error_message: Some(reason.into()),
        }
    }

    /// Number of rules the entry matched.
    pub fn matched(&self) -> usize {
        self.triggered_invocations.len() + self.failed_invocations.len()
    }

    pub fn succeeded(&self) -> usize {
        self.triggered_invocations.len()
    }

    pub fn is_failed(&self) -> bool {
        self.error_code.is_some()
    }
}

/// Outcome of a publish call, aligned with the input entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReport {
    #[serde(rename = "Entries")]
    pub entries: Vec<EntryOutcome>,
    #[serde(rename = "FailedEntryCount")]
    pub failed_entry_count: usize,
}

impl DeliveryReport {
    pub fn new(entries: Vec<EntryOutcome>) -> Self {
        let failed_entry_count = entries.iter().filter(|e| e.is_failed()).count();
        Self {
            entries,
            failed_entry_count,
        }
    }
}
