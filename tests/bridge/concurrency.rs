use std::time::Instant;

use serde_json::json;

use crate::support::{put_events, start_bus, subscribe, MockLambda, SLOW_HANDLER};

#[tokio::test]
async fn entries_in_a_batch_are_delivered_concurrently() {
    let (base, _bridge) = start_bus().await;
    let lambda = MockLambda::start().await;
    subscribe(&base, &lambda, "slow", "default", json!({})).await;

    let entries: Vec<_> = (0..5)
        .map(|i| json!({ "Source": "load", "DetailType": format!("Tick{i}") }))
        .collect();

    let started = Instant::now();
    let report = put_events(&base, json!(entries)).await;
    let elapsed = started.elapsed();

    assert_eq!(report["FailedEntryCount"], 0);
    assert_eq!(lambda.calls_to("slow"), 5);
    assert!(
        elapsed < SLOW_HANDLER * 3,
        "5 slow deliveries took {elapsed:?}"
    );
}

#[tokio::test]
async fn handlers_of_one_entry_run_concurrently() {
    let (base, _bridge) = start_bus().await;
    let lambda = MockLambda::start().await;
    for name in ["slow-a", "slow-b", "slow-c", "slow-d"] {
        subscribe(&base, &lambda, name, "default", json!({})).await;
    }

    let started = Instant::now();
    let report = put_events(&base, json!([{ "Source": "load" }])).await;
    let elapsed = started.elapsed();

    let outcome = &report["Entries"][0];
    assert_eq!(outcome["triggeredInvocations"].as_array().unwrap().len(), 4);
    assert!(
        elapsed < SLOW_HANDLER * 2,
        "4 slow handlers took {elapsed:?}"
    );
}

#[tokio::test]
async fn concurrent_publishers_each_get_their_report() {
    let (base, _bridge) = start_bus().await;
    let lambda = MockLambda::start().await;
    subscribe(&base, &lambda, "notify", "default", json!({})).await;

    let publishes = (0..8).map(|i| {
        let base = base.clone();
        tokio::spawn(async move {
            put_events(&base, json!([{ "Source": "p", "DetailType": format!("Event{i}") }])).await
        })
    });
    let reports = futures::future::join_all(publishes).await;

    for (i, report) in reports.into_iter().enumerate() {
        let report = report.unwrap();
        assert_eq!(
            report["Entries"][0]["triggeredInvocations"][0]["body"]["detailType"],
            format!("Event{i}")
        );
    }
    assert_eq!(lambda.calls_to("notify"), 8);
}
