use serde_json::json;
use valohub::test_helpers::InMemoryUpstream;

use crate::helpers::*;

#[tokio::test]
async fn status_endpoint_lists_regions() {
    let server = TestServer::new(InMemoryUpstream::new(), None).await;

    let resp = server.get("/status").await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime_secs"].as_u64().is_some());
    assert_eq!(body["batches_received"], 0);
    assert!(body["due_signals"].is_object());

    let regions = body["regions"].as_array().expect("regions should be an array");
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0]["region"], CLOSED_REGION);
    assert_eq!(regions[0]["in_window"], false);
    assert_eq!(regions[1]["region"], OPEN_REGION);
    assert_eq!(regions[1]["in_window"], true);
    assert_eq!(regions[1]["due"], true);
    assert_eq!(regions[1]["check_count"], 0);

    server.cleanup();
}

#[tokio::test]
async fn region_status_reflects_dispatch() {
    let upstream = InMemoryUpstream::new()
        .with_interest("skin-42", &[OPEN_REGION])
        .with_subscription("skin-42", OPEN_REGION, "store", "user-1");
    let server = TestServer::new(upstream, None).await;

    let resp = server
        .post("/batches")
        .await
        .json(&json!({ "region": OPEN_REGION, "items": [{ "itemId": "skin-42" }] }))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), 200);

    let resp = server.get(&format!("/status/{OPEN_REGION}")).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["check_count"], 1);
    assert_eq!(body["due"], false);
    assert_eq!(body["notifications_sent"], 1);
    assert_eq!(body["cooldowns"][0]["item_id"], "skin-42");
    assert!(body["last_checked_at"].is_string());

    server.cleanup();
}

#[tokio::test]
async fn region_status_unknown_region_returns_404() {
    let server = TestServer::new(InMemoryUpstream::new(), None).await;

    let resp = server.get("/status/mars").await;

    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert!(body["error"].as_str().unwrap().contains("mars"));

    server.cleanup();
}
