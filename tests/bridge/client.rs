use serde_json::json;

use offline_eventbridge::client::{BusClient, ClientError};
use offline_eventbridge::manifest::Manifest;
use offline_eventbridge::rules::{RegistrationOutcome, RuleId, SubscriptionRequest};
use offline_eventbridge::PutEventsEntry;

use crate::support::{start_bus, MockLambda};

#[tokio::test]
async fn subscribe_publish_unsubscribe() {
    let (base, bridge) = start_bus().await;
    let lambda = MockLambda::start().await;
    let client = BusClient::new(format!("{base}/"));
    assert_eq!(client.base_url(), base);

    let outcomes = client
        .subscribe(&SubscriptionRequest {
            name: "notify".into(),
            lambda_port: lambda.port,
            events: vec![
                json!({ "eventBridge": { "eventBus": "marketing", "pattern": { "detail": { "channel": ["email"] } } } }),
                json!({ "eventBridge": { "pattern": 42 } }),
            ],
        })
        .await
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    let id = outcomes[0].rule_id().cloned().unwrap();
    assert!(matches!(outcomes[1], RegistrationOutcome::Rejected { .. }));

    let rules = client.rules().await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].id, id);
    assert_eq!(rules[0].handler_name, "notify");
    assert_eq!(rules[0].event_bus_name, "marketing");

    let report = client
        .put_events(&[
            PutEventsEntry::new("acme.campaign", "Sent")
                .with_detail(&json!({ "channel": "email" }))
                .on_bus("marketing"),
            PutEventsEntry::new("acme.campaign", "Sent")
                .with_detail(&json!({ "channel": "sms" }))
                .on_bus("marketing"),
        ])
        .await
        .unwrap();
    assert_eq!(report.failed_entry_count, 0);
    assert_eq!(report.entries[0].succeeded(), 1);
    assert_eq!(report.entries[1].matched(), 0);
    assert_eq!(lambda.calls_to("notify"), 1);

    client.unsubscribe_all(&[id, RuleId::new("unknown")]).await.unwrap();
    assert!(client.rules().await.unwrap().is_empty());
    assert!(bridge.rules().unwrap().is_empty());
}

#[tokio::test]
async fn manifest_functions_are_subscribed() {
    let (base, bridge) = start_bus().await;
    let lambda = MockLambda::start().await;
    let manifest = Manifest::from_toml_str(&format!(
        r#"
lambda_port = {port}

[functions.notify]
name = "svc-dev-notify"
events = [
  {{ eventBridge = {{ eventBus = "marketing", pattern = {{ source = ["acme.campaign"] }} }} }},
]

[functions.health]
events = [{{ http = {{ path = "/health" }} }}]
"#,
        port = lambda.port
    ))
    .unwrap();

    let client = BusClient::new(&base);
    let mut registered = Vec::new();
    for request in manifest.subscriptions().unwrap() {
        for outcome in client.subscribe(&request).await.unwrap() {
            registered.extend(outcome.rule_id().cloned());
        }
    }
    assert_eq!(registered.len(), 1);

    let rules = bridge.rules().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].handler_name, "svc-dev-notify");

    let report = client
        .put_events(&[PutEventsEntry::new("acme.campaign", "Started").on_bus("marketing")])
        .await
        .unwrap();
    assert_eq!(report.entries[0].succeeded(), 1);
    assert_eq!(lambda.calls_to("svc-dev-notify"), 1);
}

#[tokio::test]
async fn unreachable_bus_is_a_request_error() {
    let port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = BusClient::new(format!("http://127.0.0.1:{port}"));

    let err = client.rules().await.unwrap_err();
    assert!(matches!(err, ClientError::Request { .. }), "{err}");
}
