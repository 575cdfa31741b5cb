//! HTTP routing for the webhook receiver.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::app::AppState;

use super::handlers::{liveness_handler, metrics_handler, webhook_handler};

pub const DEFAULT_WEBHOOK_PATH: &str = "/webhook";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Routing options for [`create_router_with_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Path the gateway posts notifications to.
    pub webhook_path: String,
    /// Health and metrics requests still running after this get 408.
    /// The webhook route is bounded by [`AppState::handler_timeout`] instead.
    pub request_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            webhook_path: DEFAULT_WEBHOOK_PATH.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Create the receiver router with default configuration
pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_router_with_config(app_state, &RouterConfig::default())
}

/// Create the receiver router.
///
/// Routes:
/// - `POST {webhook_path}`: notification intake (other methods get 405)
/// - `GET /health/live`
/// - `GET /metrics`
pub fn create_router_with_config(app_state: Arc<AppState>, config: &RouterConfig) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Notifications are always acknowledged with 200, so no 408 layer here.
    let webhook_routes = Router::new().route(&config.webhook_path, post(webhook_handler));

    let ops_routes = Router::new()
        .route("/health/live", get(liveness_handler))
        .route("/metrics", get(metrics_handler))
        .layer(ServiceBuilder::new().layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        )));

    Router::new()
        .merge(webhook_routes)
        .merge(ops_routes)
        .layer(trace)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{SIGNATURE_HEADER, WebhookVerifier};
    use crate::domain::WebhookAck;
    use crate::test_utils::{MockConfig, RecordingEventHandler};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const BODY: &str = r#"{"id":"t1","type":"deposit","status":"COMPLETED","address":"a","networkType":"ERC20","amount":"5","timestamp":"2025-01-01T00:00:00Z"}"#;

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState::new(
            Arc::new(WebhookVerifier::new("secret")),
            Arc::new(RecordingEventHandler::new()),
        ))
    }

    fn signed_request(path: &str) -> Request<Body> {
        let signature = WebhookVerifier::new("secret").sign(BODY.as_bytes());
        Request::post(path)
            .header(SIGNATURE_HEADER, signature)
            .body(Body::from(BODY))
            .unwrap()
    }

    async fn read_ack(response: axum::response::Response) -> WebhookAck {
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_router_config_default() {
        let config = RouterConfig::default();
        assert_eq!(config.webhook_path, "/webhook");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_router_liveness() {
        let res = create_router(test_state())
            .oneshot(Request::get("/health/live").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_router_get_on_webhook_is_method_not_allowed() {
        let res = create_router(test_state())
            .oneshot(Request::get("/webhook").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_router_custom_webhook_path() {
        let config = RouterConfig {
            webhook_path: "/ipn/sagapay".to_string(),
            ..RouterConfig::default()
        };
        let router = create_router_with_config(test_state(), &config);

        let res = router.clone().oneshot(signed_request("/ipn/sagapay")).await.unwrap();
        assert!(read_ack(res).await.received);

        let res = router.oneshot(signed_request("/webhook")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_repeated_notifications_from_one_sender_are_all_acknowledged() {
        let handler = Arc::new(RecordingEventHandler::new());
        let state = Arc::new(AppState::new(
            Arc::new(WebhookVerifier::new("secret")),
            handler.clone(),
        ));
        let router = create_router(state);

        for _ in 0..5 {
            let request = Request::post("/webhook")
                .header("X-Forwarded-For", "192.168.1.1")
                .header(
                    SIGNATURE_HEADER,
                    WebhookVerifier::new("secret").sign(BODY.as_bytes()),
                )
                .body(Body::from(BODY))
                .unwrap();
            let res = router.clone().oneshot(request).await.unwrap();
            assert!(read_ack(res).await.received);
        }
        assert_eq!(handler.call_count(), 5);
    }

    #[tokio::test]
    async fn test_slow_handler_is_acknowledged_not_timed_out() {
        let handler = Arc::new(RecordingEventHandler::with_config(
            MockConfig::success().with_latency(Duration::from_millis(300)),
        ));
        let state = Arc::new(
            AppState::new(Arc::new(WebhookVerifier::new("secret")), handler)
                .with_handler_timeout(Duration::from_millis(50)),
        );
        let config = RouterConfig {
            request_timeout: Duration::from_millis(50),
            ..RouterConfig::default()
        };

        let res = create_router_with_config(state, &config)
            .oneshot(signed_request("/webhook"))
            .await
            .unwrap();

        let ack = read_ack(res).await;
        assert!(!ack.received);
        assert_eq!(ack.error.as_deref(), Some("handler timed out"));
    }
}
