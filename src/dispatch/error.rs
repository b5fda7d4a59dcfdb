//! Error types for handler invocation and dispatch.

use std::time::Duration;

use thiserror::Error;

use crate::rules::StoreError;

/// Failure of one handler invocation. Recorded against that handler only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    /// Connection refused, reset, DNS failure, …
    #[error("transport error: {0}")]
    Transport(String),
    /// The handler endpoint answered with a non-success status.
    #[error("handler responded with status {status}: {body}")]
    Status { status: u16, body: String },
    /// The function ran and reported an error (`X-Amz-Function-Error`).
    #[error("function error ({kind}): {body}")]
    Function { kind: String, body: String },
    /// The response body is not JSON.
    #[error("malformed handler response: {0}")]
    MalformedResponse(String),
    #[error("handler did not respond within {0:?}")]
    Timeout(Duration),
}

/// Failure of a whole publish call.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
