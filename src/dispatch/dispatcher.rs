use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde_json::{Map, Value};

use super::error::{DispatchError, InvokeError};
use super::invoker::{InvocationTarget, Invoker};
use super::report::{DeliveryReport, EntryOutcome, FailedInvocation, Invocation};
use crate::event::PutEventsEntry;
use crate::ids::IdGenerator;
use crate::matcher::{matches, NormalizedEvent};
use crate::rules::{json_kind, Rule, RuleStore};

/// Matches published entries against the rule store and fans them out to
/// handlers.
///
/// Entries of a batch are delivered concurrently, and so are the handler
/// calls of each entry. A handler failure is recorded against that handler
/// and never cancels its siblings or other entries. No retries are made.
pub struct Dispatcher {
    rules: Arc<RuleStore>,
    invoker: Arc<dyn Invoker>,
    ids: Arc<dyn IdGenerator>,
    invoke_timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(rules: Arc<RuleStore>, invoker: Arc<dyn Invoker>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            rules,
            invoker,
            ids,
            invoke_timeout: None,
        }
    }

    /// Bound each handler call. `None` (the default) waits indefinitely.
    pub fn with_invoke_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.invoke_timeout = timeout;
        self
    }

    pub fn invoke_timeout(&self) -> Option<Duration> {
        self.invoke_timeout
    }

    /// Deliver a batch of entries. The report is aligned with `entries`.
    pub async fn publish(
        &self,
        entries: Vec<PutEventsEntry>,
    ) -> Result<DeliveryReport, DispatchError> {
        self.deliver_all(entries.iter().map(|entry| Ok(entry.to_fields())).collect())
            .await
    }

    /// Deliver a batch of raw JSON entries, as received over HTTP.
    ///
    /// Every JSON object is an event and is forwarded to handlers as is,
    /// whatever its field types. Entries that are not objects are reported as
    /// failed (`MalformedEntry`); the rest of the batch is delivered normally.
    pub async fn publish_values(&self, entries: Vec<Value>) -> Result<DeliveryReport, DispatchError> {
        let entries = entries
            .into_iter()
            .map(|value| match value {
                Value::Object(fields) => Ok(fields),
                other => Err(format!("entry must be a JSON object, got {}", json_kind(&other))),
            })
            .collect();
        self.deliver_all(entries).await
    }

    async fn deliver_all(
        &self,
        entries: Vec<Result<Map<String, Value>, String>>,
    ) -> Result<DeliveryReport, DispatchError> {
        let outcomes = join_all(entries.into_iter().map(|entry| self.deliver(entry)))
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        let report = DeliveryReport::new(outcomes);
        tracing::debug!(
            entries = report.entries.len(),
            failed = report.failed_entry_count,
            "published batch"
        );
        Ok(report)
    }

    async fn deliver(
        &self,
        entry: Result<Map<String, Value>, String>,
    ) -> Result<EntryOutcome, DispatchError> {
        let event_id = self.ids.next_id();
        let fields = match entry {
            Ok(fields) => fields,
            Err(reason) => {
                tracing::warn!(%event_id, %reason, "rejecting malformed entry");
                return Ok(EntryOutcome::malformed(event_id, reason));
            }
        };

        let event = NormalizedEvent::from_fields(&fields);
        let matched: Vec<Arc<Rule>> = self
            .rules
            .list()?
            .into_iter()
            .filter(|rule| matches(rule, &event))
            .collect();

        tracing::debug!(
            %event_id,
            bus = event.bus(),
            matched = matched.len(),
            "matched entry"
        );

        let payload = Value::Object(fields);
        let results = join_all(matched.iter().map(|rule| self.invoke(rule, &payload))).await;

        let mut triggered = Vec::with_capacity(results.len());
        let mut failed = Vec::new();
        for result in results {
            match result {
                Ok(invocation) => triggered.push(invocation),
                Err(failure) => failed.push(failure),
            }
        }
        Ok(EntryOutcome::delivered(event_id, triggered, failed))
    }

    async fn invoke(&self, rule: &Rule, payload: &Value) -> Result<Invocation, FailedInvocation> {
        let target = InvocationTarget {
            function: &rule.handler_name,
            endpoint: &rule.handler_endpoint,
        };
        let call = self.invoker.invoke(target, payload);
        let result = match self.invoke_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(InvokeError::Timeout(limit)),
            },
            None => call.await,
        };

        match result {
            Ok(body) => Ok(Invocation {
                body,
                function: rule.handler_name.clone(),
            }),
            Err(e) => {
                tracing::warn!(
                    function = %rule.handler_name,
                    rule_id = %rule.id,
                    error = %e,
                    "handler invocation failed"
                );
                Err(FailedInvocation {
                    function: rule.handler_name.clone(),
                    error: e.to_string(),
                })
            }
        }
    }
}
