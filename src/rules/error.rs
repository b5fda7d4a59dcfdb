//! Error types for rule registration and the rule store.

use thiserror::Error;

/// A pattern document that cannot be turned into a [`Pattern`](super::Pattern).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The top level of a pattern has to be a JSON object.
    #[error("pattern must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    /// Two top-level keys normalize to the same event field.
    #[error("pattern keys {first:?} and {second:?} both address field {field:?}")]
    DuplicateField {
        field: String,
        first: String,
        second: String,
    },
}

/// A subscription payload (or one entry of it) that was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The request body is missing `name`, `lambdaPort` or `events`, or is not JSON.
    #[error("malformed subscription request: {0}")]
    MalformedRequest(String),
    /// One `eventBridge` entry is unusable; siblings are still registered.
    #[error("invalid eventBridge entry: {0}")]
    InvalidEntry(String),
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] PatternError),
}

/// Failure of the rule store itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A writer panicked while holding the lock.
    #[error("rule store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}
