//! HTTP request handlers for the webhook receiver.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{error, info, instrument, warn};

use crate::app::AppState;
use crate::domain::WebhookAck;
use crate::infra::observability::WEBHOOKS_TOTAL;

/// Receive an instant payment notification.
///
/// The gateway is always answered with 200 so it does not redeliver; the
/// acknowledgement body tells whether the notification was accepted.
#[instrument(skip_all)]
pub async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
) -> WebhookAck {
    let payload = match state
        .verifier
        .handle_request_with_limit(request, state.max_body_bytes)
        .await
    {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Webhook rejected");
            record_outcome("rejected");
            return WebhookAck::failure(e.to_string());
        }
    };

    let outcome = tokio::time::timeout(
        state.handler_timeout,
        state.event_handler.on_payment(&payload),
    )
    .await;

    let Ok(result) = outcome else {
        error!(
            notification_id = %payload.id,
            timeout_ms = state.handler_timeout.as_millis() as u64,
            "Payment handler timed out"
        );
        record_outcome("handler_timeout");
        return WebhookAck::failure("handler timed out");
    };

    if let Err(e) = result {
        error!(
            notification_id = %payload.id,
            status = %payload.status,
            error = %e,
            "Payment handler failed"
        );
        record_outcome("handler_error");
        return WebhookAck::failure(e.to_string());
    }

    info!(
        notification_id = %payload.id,
        status = %payload.status,
        "Webhook accepted"
    );
    record_outcome("accepted");
    WebhookAck::success()
}

/// Liveness check
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Prometheus scrape endpoint; 404 when no recorder was installed.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

impl IntoResponse for WebhookAck {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

fn record_outcome(outcome: &'static str) {
    metrics::counter!(WEBHOOKS_TOTAL, "outcome" => outcome).increment(1);
}
