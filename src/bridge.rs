//! EventBridge - the rule store and dispatcher behind one handle.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::dispatch::{DeliveryReport, DispatchError, Dispatcher, Invoker, LambdaInvoker};
use crate::event::PutEventsEntry;
use crate::ids::{IdGenerator, UuidGenerator};
use crate::rules::{
    NewRule, RegistrationError, Rule, RuleId, RuleStore, StoreError, SubscriptionRequest,
};

/// Settings that shape how rules are built and handlers are called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Host of the Lambda-compatible endpoints; rules registered with a
    /// `lambdaPort` call `http://{lambda_host}:{lambdaPort}`.
    pub lambda_host: String,
    /// Bound on each handler call. `None` waits indefinitely.
    pub invoke_timeout: Option<Duration>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            lambda_host: "localhost".to_string(),
            invoke_timeout: None,
        }
    }
}

/// A local event bus.
///
/// ## Example
///
/// ```ignore
/// use offline_eventbridge::EventBridge;
/// use offline_eventbridge::rules::SubscriptionRequest;
///
/// let bridge = EventBridge::new();
/// let ids = bridge.subscribe(&SubscriptionRequest {
///     name: "notify".into(),
///     lambda_port: 3002,
///     events: vec![json!({ "eventBridge": { "eventBus": "marketing" } })],
/// })?;
///
/// let report = bridge
///     .publish(vec![PutEventsEntry::new("acme", "Sent").on_bus("marketing")])
///     .await?;
/// ```
pub struct EventBridge {
    rules: Arc<RuleStore>,
    dispatcher: Dispatcher,
    config: BridgeConfig,
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBridge {
    /// A bus that calls handlers through the Lambda Invoke API.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> EventBridgeBuilder {
        EventBridgeBuilder::default()
    }

    /// Register one rule per `eventBridge` event of `request`.
    ///
    /// The result is aligned with those events. A malformed entry is
    /// rejected on its own; only a store failure fails the whole call.
    pub fn subscribe(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<Vec<Result<RuleId, RegistrationError>>, StoreError> {
        let mut results = Vec::new();
        for rule in request.rules(&self.config.lambda_host) {
            match rule {
                Ok(rule) => {
                    let id = self.rules.register(rule)?;
                    tracing::debug!(function = %request.name, rule_id = %id, "registered rule");
                    results.push(Ok(id));
                }
                Err(e) => {
                    tracing::warn!(function = %request.name, error = %e, "rejected subscription entry");
                    results.push(Err(e));
                }
            }
        }
        Ok(results)
    }

    pub fn register(&self, rule: NewRule) -> Result<RuleId, StoreError> {
        self.rules.register(rule)
    }

    pub fn rules(&self) -> Result<Vec<Arc<Rule>>, StoreError> {
        self.rules.list()
    }

    /// Remove a rule; unknown ids are ignored.
    pub fn remove(&self, id: &RuleId) -> Result<bool, StoreError> {
        let removed = self.rules.remove(id)?;
        tracing::debug!(rule_id = %id, removed, "removing rule");
        Ok(removed)
    }

    pub async fn publish(
        &self,
        entries: Vec<PutEventsEntry>,
    ) -> Result<DeliveryReport, DispatchError> {
        self.dispatcher.publish(entries).await
    }

    pub async fn publish_values(&self, entries: Vec<Value>) -> Result<DeliveryReport, DispatchError> {
        self.dispatcher.publish_values(entries).await
    }

    pub fn store(&self) -> &Arc<RuleStore> {
        &self.rules
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

/// Builder for [`EventBridge`]; every collaborator has a default.
#[derive(Default)]
pub struct EventBridgeBuilder {
    invoker: Option<Arc<dyn Invoker>>,
    ids: Option<Arc<dyn IdGenerator>>,
    config: BridgeConfig,
}

impl EventBridgeBuilder {
    pub fn invoker(mut self, invoker: Arc<dyn Invoker>) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Generator used for both rule ids and delivery ids.
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> EventBridge {
        let ids: Arc<dyn IdGenerator> = match self.ids {
            Some(ids) => ids,
            None => Arc::new(UuidGenerator),
        };
        let invoker: Arc<dyn Invoker> = match self.invoker {
            Some(invoker) => invoker,
            None => Arc::new(LambdaInvoker::new()),
        };
        let rules = Arc::new(RuleStore::with_id_generator(Arc::clone(&ids)));
        let dispatcher = Dispatcher::new(Arc::clone(&rules), invoker, ids)
            .with_invoke_timeout(self.config.invoke_timeout);
        EventBridge {
            rules,
            dispatcher,
            config: self.config,
        }
    }
}
