use serde_json::{json, Value};

use crate::support::{put_events, start_bus, subscribe, MockLambda};

#[tokio::test]
async fn delivers_entry_verbatim() {
    let (base, _bridge) = start_bus().await;
    let lambda = MockLambda::start().await;
    subscribe(&base, &lambda, "notify", "marketing", json!({ "source": ["acme.campaign"] })).await;

    let entry = json!({
        "Source": "acme.campaign",
        "DetailType": "CampaignStarted",
        "Detail": "{\"campaignId\":7}",
        "EventBusName": "marketing",
        "Resources": ["arn:campaign:7"]
    });
    let report = put_events(&base, json!([entry.clone()])).await;

    assert_eq!(report["FailedEntryCount"], 0);
    let outcome = &report["Entries"][0];
    assert!(outcome["EventId"].is_string());
    assert_eq!(
        outcome["triggeredInvocations"],
        json!([{
            "body": { "function": "notify", "detailType": "CampaignStarted" },
            "function": "notify"
        }])
    );
    assert!(outcome.get("ErrorCode").is_none());

    let calls = lambda.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function, "notify");
    assert_eq!(calls[0].payload, entry);
    assert_eq!(calls[0].invocation_type.as_deref(), Some("RequestResponse"));
}

#[tokio::test]
async fn removed_rule_is_not_invoked() {
    let (base, _bridge) = start_bus().await;
    let lambda = MockLambda::start().await;
    let id = subscribe(&base, &lambda, "notify", "default", json!({})).await;

    reqwest::Client::new()
        .delete(format!("{base}/subscriptions/{id}"))
        .send()
        .await
        .unwrap();

    let report = put_events(&base, json!([{ "Source": "acme", "DetailType": "Ping" }])).await;
    assert_eq!(report["FailedEntryCount"], 0);
    assert_eq!(report["Entries"][0]["triggeredInvocations"], json!([]));
    assert!(lambda.calls().is_empty());
}

#[tokio::test]
async fn matches_on_detail_and_bus() {
    let (base, _bridge) = start_bus().await;
    let lambda = MockLambda::start().await;
    subscribe(
        &base,
        &lambda,
        "on-ok",
        "orders",
        json!({ "detail-type": ["OrderPlaced"], "detail": { "status": ["OK"] } }),
    )
    .await;
    subscribe(&base, &lambda, "everything-default", "default", json!({})).await;

    let entries = json!([
        { "Source": "shop", "DetailType": "OrderPlaced", "Detail": "{\"status\":\"OK\"}", "EventBusName": "orders" },
        { "Source": "shop", "DetailType": "OrderPlaced", "Detail": "{\"status\":\"FAILED\"}", "EventBusName": "orders" },
        { "Source": "shop", "DetailType": "OrderPlaced", "Detail": "{\"status\":\"OK\"}", "EventBusName": "billing" },
        { "Source": "shop", "DetailType": "OrderPlaced", "Detail": "{\"status\":\"OK\"}" }
    ]);
    let report = put_events(&base, entries).await;

    let triggered: Vec<usize> = report["Entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["triggeredInvocations"].as_array().unwrap().len())
        .collect();
    assert_eq!(triggered, [1, 0, 0, 1]);
    assert_eq!(report["FailedEntryCount"], 0);

    assert_eq!(lambda.calls_to("on-ok"), 1);
    assert_eq!(lambda.calls_to("everything-default"), 1);
}

#[tokio::test]
async fn partial_failure_still_delivers() {
    let (base, _bridge) = start_bus().await;
    let lambda = MockLambda::start().await;
    subscribe(&base, &lambda, "good", "default", json!({})).await;
    subscribe(&base, &lambda, "broken", "default", json!({})).await;

    let report = put_events(&base, json!([{ "Source": "a", "DetailType": "b" }])).await;

    assert_eq!(report["FailedEntryCount"], 0);
    let outcome = &report["Entries"][0];
    assert_eq!(outcome["triggeredInvocations"][0]["function"], "good");
    assert_eq!(outcome["failedInvocations"][0]["function"], "broken");
    assert!(outcome["failedInvocations"][0]["error"]
        .as_str()
        .unwrap()
        .contains("500"));
    assert!(outcome.get("ErrorCode").is_none());
}

#[tokio::test]
async fn entry_fails_when_every_handler_fails() {
    let (base, _bridge) = start_bus().await;
    let lambda = MockLambda::start().await;
    subscribe(&base, &lambda, "broken", "default", json!({})).await;
    subscribe(&base, &lambda, "crashing", "default", json!({})).await;

    let report = put_events(
        &base,
        json!([
            { "Source": "a", "DetailType": "b" },
            { "Source": "a", "DetailType": "c", "EventBusName": "nobody-listens" }
        ]),
    )
    .await;

    assert_eq!(report["FailedEntryCount"], 1);
    let failed = &report["Entries"][0];
    assert_eq!(failed["ErrorCode"], "InvocationFailed");
    assert_eq!(failed["ErrorMessage"], "0 of 2 handlers succeeded");

    let errors: Vec<&str> = failed["failedInvocations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["error"].as_str().unwrap())
        .collect();
    assert!(errors.iter().any(|e| e.contains("function error (Unhandled)")));
    assert!(errors.iter().any(|e| e.contains("status 500")));

    // An entry no rule matched is not a failure.
    assert!(report["Entries"][1].get("ErrorCode").is_none());
}

#[tokio::test]
async fn malformed_entry_fails_alone() {
    let (base, _bridge) = start_bus().await;
    let lambda = MockLambda::start().await;
    subscribe(&base, &lambda, "notify", "default", json!({})).await;

    let report = put_events(&base, json!(["not an entry", { "Source": "a" }])).await;

    assert_eq!(report["FailedEntryCount"], 1);
    assert_eq!(report["Entries"][0]["ErrorCode"], "MalformedEntry");
    assert_eq!(report["Entries"][1]["triggeredInvocations"][0]["function"], "notify");
    assert_eq!(lambda.calls().len(), 1);
}

#[tokio::test]
async fn accepts_any_content_type() {
    let (base, _bridge) = start_bus().await;
    let lambda = MockLambda::start().await;
    subscribe(&base, &lambda, "notify", "default", json!({})).await;
    let body = json!({ "Entries": [{ "Source": "a", "DetailType": "b" }] }).to_string();

    let amz = reqwest::Client::new()
        .post(&base)
        .header("Content-Type", "application/x-amz-json-1.1")
        .header("X-Amz-Target", "AWSEvents.PutEvents")
        .body(body.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(amz.status(), 200);
    let report: Value = amz.json().await.unwrap();
    assert_eq!(report["Entries"][0]["triggeredInvocations"][0]["function"], "notify");

    let bare = reqwest::Client::new().post(&base).body(body).send().await.unwrap();
    assert_eq!(bare.status(), 200);

    assert_eq!(lambda.calls().len(), 2);
}

#[tokio::test]
async fn entries_with_non_string_fields_are_delivered() {
    let (base, _bridge) = start_bus().await;
    let lambda = MockLambda::start().await;
    subscribe(&base, &lambda, "catch-all", "default", json!({})).await;

    let entry = json!({ "Source": 42, "DetailType": "x", "Detail": { "inline": true } });
    let report = put_events(&base, json!([entry.clone()])).await;

    assert_eq!(report["FailedEntryCount"], 0);
    assert!(report["Entries"][0].get("ErrorCode").is_none());
    assert_eq!(report["Entries"][0]["triggeredInvocations"][0]["function"], "catch-all");
    let calls = lambda.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].payload, entry);
}

#[tokio::test]
async fn missing_entries_is_an_empty_report() {
    let (base, _bridge) = start_bus().await;

    for body in ["{}", ""] {
        let resp = reqwest::Client::new()
            .post(&base)
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "body {body:?}");
        assert_eq!(
            resp.json::<Value>().await.unwrap(),
            json!({ "Entries": [], "FailedEntryCount": 0 })
        );
    }
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let (base, _bridge) = start_bus().await;

    for body in ["{ nope", "{\"Entries\": 3}", "[]"] {
        let resp = reqwest::Client::new()
            .post(&base)
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "body {body}");
        let error: Value = resp.json().await.unwrap();
        assert!(error["error"].is_string());
    }
}

#[tokio::test]
async fn unreachable_handler_is_a_transport_failure() {
    let (base, _bridge) = start_bus().await;

    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let resp = reqwest::Client::new()
        .post(format!("{base}/subscriptions"))
        .json(&json!({
            "name": "gone",
            "lambdaPort": port,
            "events": [{ "eventBridge": {} }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let report = put_events(&base, json!([{ "Source": "a" }])).await;

    assert_eq!(report["FailedEntryCount"], 1);
    let error = report["Entries"][0]["failedInvocations"][0]["error"]
        .as_str()
        .unwrap();
    assert!(error.starts_with("transport error"), "{error}");
}
