//! Handler invocation transport.

use async_trait::async_trait;
use serde_json::Value;

use super::error::InvokeError;

/// Which handler to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationTarget<'a> {
    /// Function name.
    pub function: &'a str,
    /// Base URL, e.g. `http://localhost:3002`.
    pub endpoint: &'a str,
}

/// Calls a handler with an event and waits for its response.
///
/// Implementations might include:
/// - `LambdaInvoker` - the Lambda Invoke API over HTTP (included)
/// - in-process fakes for tests
#[async_trait]
pub trait Invoker: Send + Sync {
    /// Invoke `target` with `payload` (request/response) and return the
    /// decoded response body.
    async fn invoke(
        &self,
        target: InvocationTarget<'_>,
        payload: &Value,
    ) -> Result<Value, InvokeError>;
}

/// Invokes functions through the Lambda Invoke API:
/// `POST {endpoint}/2015-03-31/functions/{function}/invocations`.
///
/// This is what local Lambda emulators (serverless-offline, SAM local)
/// listen on.
#[derive(Debug, Clone, Default)]
pub struct LambdaInvoker {
    client: reqwest::Client,
}

impl LambdaInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (proxies, TLS, connection pool limits).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn invoke_url(target: InvocationTarget<'_>) -> String {
        format!(
            "{}/2015-03-31/functions/{}/invocations",
            target.endpoint.trim_end_matches('/'),
            target.function
        )
    }
}

#[async_trait]
impl Invoker for LambdaInvoker {
    async fn invoke(
        &self,
        target: InvocationTarget<'_>,
        payload: &Value,
    ) -> Result<Value, InvokeError> {
        let url = Self::invoke_url(target);
        tracing::debug!(function = target.function, %url, "invoking handler");

        let response = self
            .client
            .post(&url)
            .header("X-Amz-Invocation-Type", "RequestResponse")
            .json(payload)
            .send()
            .await
            .map_err(|e| InvokeError::Transport(e.to_string()))?;

        let status = response.status();
        let function_error = response
            .headers()
            .get("X-Amz-Function-Error")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| InvokeError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(InvokeError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        if let Some(kind) = function_error {
            return Err(InvokeError::Function {
                kind,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        parse_body(&body)
    }
}

/// An empty body (a function that returns nothing) decodes to `null`.
fn parse_body(body: &[u8]) -> Result<Value, InvokeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| InvokeError::MalformedResponse(e.to_string()))
}
