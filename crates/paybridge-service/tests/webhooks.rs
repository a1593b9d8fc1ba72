//! Webhook endpoint integration tests.

mod common;

use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use serde_json::{json, Value};

use common::{
    event_payload, sign, test_config, unix_now, CapturedLogs, FakeProvider, TestHarness,
    WEBHOOK_SECRET,
};
use paybridge_service::ServiceConfig;

fn signature_header(value: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("stripe-signature"),
        HeaderValue::from_str(value).unwrap(),
    )
}

fn completed_payload() -> Vec<u8> {
    event_payload(
        "checkout.session.completed",
        json!({
            "id": "cs_test_xyz",
            "object": "checkout.session",
            "customer": "cus_123",
            "subscription": "sub_456",
            "payment_status": "paid"
        }),
    )
}

#[tokio::test]
async fn valid_completed_event_is_acknowledged_and_logged() {
    let harness = TestHarness::new();
    let (logs, _guard) = CapturedLogs::install();

    let payload = completed_payload();
    let (name, value) = signature_header(&sign(&payload, unix_now()));

    let response = harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .bytes(Bytes::from(payload))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "received": true }));

    let output = logs.contents();
    assert!(output.contains("Checkout session completed"), "logs: {output}");
    assert!(output.contains("cs_test_xyz"), "logs: {output}");
}

#[tokio::test]
async fn tampered_body_is_rejected() {
    let harness = TestHarness::new();

    let payload = completed_payload();
    let (name, value) = signature_header(&sign(&payload, unix_now()));

    let mut tampered = payload.clone();
    let last = tampered.len() - 1;
    tampered.insert(last, b' ');

    let response = harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .bytes(Bytes::from(tampered))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().starts_with("Webhook Error:"));
}

#[tokio::test]
async fn missing_signature_header_is_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/webhook")
        .bytes(Bytes::from(completed_payload()))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().starts_with("Webhook Error:"));
}

#[tokio::test]
async fn wrong_secret_is_rejected() {
    let harness = TestHarness::new();

    let payload = completed_payload();
    let header = paybridge_core::webhook::signature_header(&payload, "whsec_other", unix_now());
    let (name, value) = signature_header(&header);

    let response = harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .bytes(Bytes::from(payload))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let text = response.text();
    assert!(text.starts_with("Webhook Error:"));
    assert!(!text.contains(WEBHOOK_SECRET));
}

#[tokio::test]
async fn stale_timestamp_is_rejected() {
    let harness = TestHarness::new();

    let payload = completed_payload();
    let (name, value) = signature_header(&sign(&payload, unix_now() - 3600));

    let response = harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .bytes(Bytes::from(payload))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().starts_with("Webhook Error:"));
}

#[tokio::test]
async fn unknown_event_type_is_acknowledged() {
    let harness = TestHarness::new();
    let (logs, _guard) = CapturedLogs::install();

    let payload = event_payload("customer.created", json!({ "id": "cus_123" }));
    let (name, value) = signature_header(&sign(&payload, unix_now()));

    let response = harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .bytes(Bytes::from(payload))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["received"], true);
    assert!(logs.contents().contains("Unhandled event type"));
}

#[tokio::test]
async fn handler_failure_is_still_acknowledged() {
    let harness = TestHarness::new();

    let payload = event_payload("invoice.payment_succeeded", json!({ "amount_paid": 900 }));
    let (name, value) = signature_header(&sign(&payload, unix_now()));

    let response = harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .bytes(Bytes::from(payload))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn subscription_deleted_is_acknowledged() {
    let harness = TestHarness::new();

    let payload = event_payload(
        "customer.subscription.deleted",
        json!({ "id": "sub_456", "customer": "cus_123" }),
    );
    let (name, value) = signature_header(&sign(&payload, unix_now()));

    harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .bytes(Bytes::from(payload))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn signed_garbage_is_rejected() {
    let harness = TestHarness::new();

    let payload = b"not an event".to_vec();
    let (name, value) = signature_header(&sign(&payload, unix_now()));

    let response = harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .bytes(Bytes::from(payload))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().starts_with("Webhook Error:"));
}

#[tokio::test]
async fn oversized_body_is_rejected_before_verification() {
    let config = ServiceConfig {
        max_body_bytes: 256,
        ..test_config()
    };
    let harness = TestHarness::with(config, FakeProvider::new());

    let payload = event_payload(
        "checkout.session.completed",
        json!({ "id": "cs_test_xyz", "metadata": { "note": "x".repeat(1024) } }),
    );
    assert!(payload.len() > 256);
    let (name, value) = signature_header(&sign(&payload, unix_now()));

    let response = harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .bytes(Bytes::from(payload))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(harness.provider.verification_count(), 0);
}

#[tokio::test]
async fn body_within_limit_is_verified() {
    let harness = TestHarness::new();

    let payload = completed_payload();
    let (name, value) = signature_header(&sign(&payload, unix_now()));

    harness
        .server
        .post("/webhook")
        .add_header(name, value)
        .bytes(Bytes::from(payload))
        .await
        .assert_status_ok();

    assert_eq!(harness.provider.verification_count(), 1);
}
