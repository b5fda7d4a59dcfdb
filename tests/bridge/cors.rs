use reqwest::Method;

use crate::support::start_bus;

#[tokio::test]
async fn responses_allow_any_origin() {
    let (base, _bridge) = start_bus().await;

    let resp = reqwest::Client::new()
        .get(format!("{base}/subscriptions"))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn answers_preflight() {
    let (base, _bridge) = start_bus().await;

    let resp = reqwest::Client::new()
        .request(Method::OPTIONS, format!("{base}/subscriptions"))
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    let headers = resp.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers.contains_key("access-control-allow-methods"));
    let allowed = headers["access-control-allow-headers"]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("content-type"));
    assert!(allowed.contains("x-requested-with"));
}
