//! Integration tests for the webhook receiver.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use sagapay::api::{RouterConfig, create_router, create_router_with_config};
use sagapay::app::{AppState, SIGNATURE_HEADER, WebhookVerifier};
use sagapay::domain::{NetworkType, TransactionStatus, TransactionType, WebhookAck};
use sagapay::test_utils::{MockConfig, RecordingEventHandler};

const SECRET: &str = "s2";

const COMPLETED_DEPOSIT: &str = r#"{"id":"t1","type":"deposit","status":"COMPLETED","address":"bnb1qxy","networkType":"BEP20","amount":"1.5","udf":"order-123","txHash":"0xabc","timestamp":"2025-01-01T00:00:00Z"}"#;

fn create_test_router(handler: Arc<RecordingEventHandler>) -> Router {
    let verifier = Arc::new(WebhookVerifier::new(SECRET));
    create_router(Arc::new(AppState::new(verifier, handler)))
}

fn signed_request(uri: &str, body: &str, secret: &str) -> Request<Body> {
    let signature = WebhookVerifier::new(secret).sign(body.as_bytes());
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_ack(response: axum::response::Response) -> WebhookAck {
    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body_bytes).unwrap()
}

#[tokio::test]
async fn test_authentic_notification_is_acknowledged_and_dispatched() {
    let handler = Arc::new(RecordingEventHandler::new());
    let router = create_test_router(Arc::clone(&handler));

    let response = router
        .oneshot(signed_request("/webhook", COMPLETED_DEPOSIT, SECRET))
        .await
        .unwrap();

    assert_eq!(read_ack(response).await, WebhookAck::success());

    let payloads = handler.payloads();
    assert_eq!(payloads.len(), 1);
    let payload = &payloads[0];
    assert_eq!(payload.id, "t1");
    assert_eq!(payload.transaction_type, TransactionType::Deposit);
    assert_eq!(payload.status, TransactionStatus::Completed);
    assert_eq!(payload.network_type, NetworkType::Bep20);
    assert_eq!(payload.udf.as_deref(), Some("order-123"));
    assert_eq!(payload.tx_hash.as_deref(), Some("0xabc"));
}

#[tokio::test]
async fn test_wrong_secret_is_rejected_with_200() {
    let handler = Arc::new(RecordingEventHandler::new());
    let router = create_test_router(Arc::clone(&handler));

    let response = router
        .oneshot(signed_request("/webhook", COMPLETED_DEPOSIT, "not-the-secret"))
        .await
        .unwrap();

    let ack = read_ack(response).await;
    assert!(!ack.received);
    assert_eq!(ack.error.as_deref(), Some("invalid webhook signature"));
    assert_eq!(handler.call_count(), 0);
}

#[tokio::test]
async fn test_tampered_body_is_rejected() {
    let handler = Arc::new(RecordingEventHandler::new());
    let router = create_test_router(Arc::clone(&handler));

    let signature = WebhookVerifier::new(SECRET).sign(COMPLETED_DEPOSIT.as_bytes());
    let tampered = COMPLETED_DEPOSIT.replace("\"1.5\"", "\"150\"");
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(tampered))
        .unwrap();

    let ack = read_ack(router.oneshot(request).await.unwrap()).await;
    assert!(!ack.received);
    assert_eq!(handler.call_count(), 0);
}

#[tokio::test]
async fn test_missing_signature_header() {
    let handler = Arc::new(RecordingEventHandler::new());
    let router = create_test_router(Arc::clone(&handler));

    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("Content-Type", "application/json")
        .body(Body::from(COMPLETED_DEPOSIT))
        .unwrap();

    let ack = read_ack(router.oneshot(request).await.unwrap()).await;
    assert!(!ack.received);
    assert_eq!(
        ack.error.as_deref(),
        Some("missing SagaPay signature in headers")
    );
    assert_eq!(handler.call_count(), 0);
}

#[tokio::test]
async fn test_authentic_but_malformed_payload() {
    let handler = Arc::new(RecordingEventHandler::new());
    let router = create_test_router(Arc::clone(&handler));

    let response = router
        .oneshot(signed_request("/webhook", r#"{"id":"t1"}"#, SECRET))
        .await
        .unwrap();

    let ack = read_ack(response).await;
    assert!(!ack.received);
    assert!(ack.error.is_some());
    assert_eq!(handler.call_count(), 0);
}

#[tokio::test]
async fn test_handler_failure_still_answers_200() {
    let handler = Arc::new(RecordingEventHandler::failing("order not found"));
    let router = create_test_router(Arc::clone(&handler));

    let response = router
        .oneshot(signed_request("/webhook", COMPLETED_DEPOSIT, SECRET))
        .await
        .unwrap();

    let ack = read_ack(response).await;
    assert!(!ack.received);
    assert!(ack.error.unwrap().contains("order not found"));
    assert_eq!(handler.call_count(), 1);
}

#[tokio::test]
async fn test_redelivered_notification_is_acknowledged_every_time() {
    let handler = Arc::new(RecordingEventHandler::new());
    let router = create_test_router(Arc::clone(&handler));

    for _ in 0..2 {
        let response = router
            .clone()
            .oneshot(signed_request("/webhook", COMPLETED_DEPOSIT, SECRET))
            .await
            .unwrap();
        assert_eq!(read_ack(response).await, WebhookAck::success());
    }

    assert_eq!(handler.call_count(), 2);
}

#[tokio::test]
async fn test_slow_handler_answers_200_within_request_timeout() {
    let handler = Arc::new(RecordingEventHandler::with_config(
        MockConfig::success().with_latency(Duration::from_millis(300)),
    ));
    let verifier = Arc::new(WebhookVerifier::new(SECRET));
    let config = RouterConfig {
        request_timeout: Duration::from_millis(50),
        ..RouterConfig::default()
    };
    let state = AppState::new(verifier, handler.clone()).with_handler_timeout(config.request_timeout);
    let router = create_router_with_config(Arc::new(state), &config);

    let response = router
        .oneshot(signed_request("/webhook", COMPLETED_DEPOSIT, SECRET))
        .await
        .unwrap();

    assert_eq!(
        read_ack(response).await,
        WebhookAck::failure("handler timed out")
    );
    assert_eq!(handler.call_count(), 0);
}

#[tokio::test]
async fn test_get_on_webhook_is_method_not_allowed() {
    let router = create_test_router(Arc::new(RecordingEventHandler::new()));

    let request = Request::builder()
        .method("GET")
        .uri("/webhook")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_configured_webhook_path() {
    let handler = Arc::new(RecordingEventHandler::new());
    let verifier = Arc::new(WebhookVerifier::new(SECRET));
    let config = RouterConfig {
        webhook_path: "/ipn/sagapay".to_string(),
        ..RouterConfig::default()
    };
    let router = create_router_with_config(
        Arc::new(AppState::new(verifier, handler.clone())),
        &config,
    );

    let response = router
        .oneshot(signed_request("/ipn/sagapay", COMPLETED_DEPOSIT, SECRET))
        .await
        .unwrap();

    assert!(read_ack(response).await.received);
    assert_eq!(handler.call_count(), 1);
}

#[tokio::test]
async fn test_liveness_endpoint() {
    let router = create_test_router(Arc::new(RecordingEventHandler::new()));

    let request = Request::builder()
        .uri("/health/live")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metrics_disabled_without_recorder() {
    let router = create_test_router(Arc::new(RecordingEventHandler::new()));

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
