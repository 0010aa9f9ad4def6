use serde_json::json;
use valohub::test_helpers::InMemoryUpstream;

use crate::helpers::*;

fn interested_upstream() -> InMemoryUpstream {
    InMemoryUpstream::new()
        .with_interest("skin-42", &[OPEN_REGION, CLOSED_REGION])
        .with_subscription("skin-42", OPEN_REGION, "store", "user-1")
        .with_subscription("skin-42", OPEN_REGION, "nightmarket", "user-2")
}

#[tokio::test]
async fn ingest_dispatches_batch_and_returns_result() {
    let server = TestServer::new(interested_upstream(), None).await;

    let resp = server
        .post("/batches")
        .await
        .json(&json!({
            "region": OPEN_REGION,
            "items": [
                { "itemId": "skin-42", "displayName": "Prime Vandal" },
                { "displayName": "no id" }
            ]
        }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["skipped"], false);
    assert_eq!(body["source"], "store");
    assert_eq!(body["processed_count"], 1);
    assert_eq!(body["notified_count"], 1);
    assert_eq!(body["notifications"][0]["channel"], format!("valohub/{OPEN_REGION}/store/skin-42"));
    assert_eq!(server.sink.channels(), vec![format!("valohub/{OPEN_REGION}/store/skin-42")]);

    server.cleanup();
}

#[tokio::test]
async fn ingest_uses_batch_source() {
    let server = TestServer::new(interested_upstream(), None).await;

    let resp = server
        .post("/batches")
        .await
        .json(&json!({
            "region": OPEN_REGION,
            "source": "nightmarket",
            "items": [{ "itemId": "skin-42" }]
        }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), 200);
    assert_eq!(
        server.sink.channels(),
        vec![format!("valohub/{OPEN_REGION}/nightmarket/skin-42")]
    );

    server.cleanup();
}

#[tokio::test]
async fn ingest_outside_window_is_skipped() {
    let server = TestServer::new(interested_upstream(), None).await;

    let resp = server
        .post("/batches")
        .await
        .json(&json!({ "region": CLOSED_REGION, "items": [{ "itemId": "skin-42" }] }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["skipped"], true);
    assert_eq!(body["reason"], "outside_window");
    assert!(server.sink.sent().is_empty());

    server.cleanup();
}

#[tokio::test]
async fn ingest_same_batch_twice_reports_no_change() {
    let server = TestServer::new(interested_upstream(), None).await;
    let batch = json!({ "region": OPEN_REGION, "items": [{ "itemId": "skin-42" }] });

    let first = server.post("/batches").await.json(&batch).send().await.expect("Request failed");
    assert_eq!(first.status(), 200);

    let second = server.post("/batches").await.json(&batch).send().await.expect("Request failed");
    let body: serde_json::Value = second.json().await.expect("Failed to parse JSON");
    assert_eq!(body["skipped"], true);
    assert_eq!(body["reason"], "no_change");
    assert_eq!(server.sink.sent().len(), 1);

    server.cleanup();
}

#[tokio::test]
async fn ingest_unknown_region_returns_404() {
    let server = TestServer::new(interested_upstream(), None).await;

    let resp = server
        .post("/batches")
        .await
        .json(&json!({ "region": "mars", "items": [] }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Unknown region: mars");

    server.cleanup();
}

#[tokio::test]
async fn ingest_malformed_body_is_rejected() {
    let server = TestServer::new(interested_upstream(), None).await;

    let resp = server
        .post("/batches")
        .await
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .expect("Request failed");

    assert!(resp.status().is_client_error());

    server.cleanup();
}

#[tokio::test]
async fn ingest_requires_api_key_when_configured() {
    let server = TestServer::new(interested_upstream(), Some(API_KEY)).await;
    let batch = json!({ "region": OPEN_REGION, "items": [] });

    let resp = server.post("/batches").await.json(&batch).send().await.expect("Request failed");
    assert_eq!(resp.status(), 401);

    let resp = server
        .post("/batches")
        .await
        .bearer_auth("wrong-key")
        .json(&batch)
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), 401);

    let resp = server
        .post("/batches")
        .await
        .bearer_auth(API_KEY)
        .json(&batch)
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), 200);

    let resp = server.get("/health").await;
    assert_eq!(resp.status(), 200);

    server.cleanup();
}
