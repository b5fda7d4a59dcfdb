//! HTTP client for a running bus.
//!
//! Used by the binary to subscribe functions against a bus that may have been
//! started by another process, and to clean up afterwards.

use futures::future::join_all;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::dispatch::DeliveryReport;
use crate::event::PutEventsEntry;
use crate::rules::{RegistrationOutcome, Rule, RuleId, SubscriptionRequest};
use crate::wire::Envelope;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("bus responded {status} to {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
}

#[derive(Debug, Clone)]
pub struct BusClient {
    base_url: String,
    http: reqwest::Client,
}

impl BusClient {
    /// `base_url` is the bus root, e.g. `http://localhost:4002`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register a function's `eventBridge` events.
    pub async fn subscribe(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<Vec<RegistrationOutcome>, ClientError> {
        let url = format!("{}/subscriptions", self.base_url);
        let response = self.http.post(&url).json(request).send().await;
        read_json(url, response).await
    }

    pub async fn rules(&self) -> Result<Vec<Rule>, ClientError> {
        let url = format!("{}/subscriptions", self.base_url);
        let response = self.http.get(&url).send().await;
        let envelope: Envelope<Vec<Rule>> = read_json(url, response).await?;
        Ok(envelope.body)
    }

    pub async fn unsubscribe(&self, id: &RuleId) -> Result<(), ClientError> {
        let url = format!("{}/subscriptions/{}", self.base_url, id);
        let response = self.http.delete(&url).send().await;
        let _: Envelope<String> = read_json(url, response).await?;
        Ok(())
    }

    /// Remove every rule in `ids` concurrently. All removals are attempted;
    /// the first error, if any, is returned.
    pub async fn unsubscribe_all(&self, ids: &[RuleId]) -> Result<(), ClientError> {
        let results = join_all(ids.iter().map(|id| self.unsubscribe(id))).await;
        results.into_iter().collect()
    }

    pub async fn put_events(
        &self,
        entries: &[PutEventsEntry],
    ) -> Result<DeliveryReport, ClientError> {
        let url = self.base_url.clone();
        let body = serde_json::json!({ "Entries": entries });
        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/x-amz-json-1.1")
            .header("X-Amz-Target", "AWSEvents.PutEvents")
            .body(body.to_string())
            .send()
            .await;
        read_json(url, response).await
    }
}

async fn read_json<T: DeserializeOwned>(
    url: String,
    response: Result<reqwest::Response, reqwest::Error>,
) -> Result<T, ClientError> {
    let response = match response {
        Ok(response) => response,
        Err(source) => return Err(ClientError::Request { url, source }),
    };
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status {
            url,
            status: status.as_u16(),
            body,
        });
    }
    match response.json().await {
        Ok(value) => Ok(value),
        Err(source) => Err(ClientError::Request { url, source }),
    }
}
