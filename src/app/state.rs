//! Application state management.
//!
//! This module provides the shared state of the webhook receiver that is
//! accessible to all request handlers via Axum's State extractor.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::PaymentEventHandler;
use crate::infra::PrometheusHandle;

use super::webhook::{DEFAULT_MAX_BODY_BYTES, WebhookVerifier};

/// Shared application state for the webhook receiver.
///
/// # Thread Safety
///
/// All contained types are wrapped in `Arc` and implement `Send + Sync`,
/// making `AppState` safe to share across async tasks.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
///
/// let verifier = Arc::new(WebhookVerifier::new(webhook_secret));
/// let state = AppState::new(verifier, Arc::new(LoggingEventHandler));
///
/// let router = create_router(Arc::new(state));
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Verifier holding the webhook secret.
    pub verifier: Arc<WebhookVerifier>,

    /// Merchant logic run for each authentic notification.
    pub event_handler: Arc<dyn PaymentEventHandler>,

    /// Prometheus handle for GET /metrics, when a recorder is installed.
    pub metrics: Option<Arc<PrometheusHandle>>,

    /// Largest notification body read before rejecting.
    pub max_body_bytes: usize,

    /// How long the event handler may run before the notification is
    /// acknowledged as failed.
    pub handler_timeout: Duration,
}

/// Default bound on a single `PaymentEventHandler::on_payment` call.
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(30);

impl AppState {
    /// Creates a new `AppState` without a metrics endpoint.
    #[must_use]
    pub fn new(
        verifier: Arc<WebhookVerifier>,
        event_handler: Arc<dyn PaymentEventHandler>,
    ) -> Self {
        Self {
            verifier,
            event_handler,
            metrics: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            handler_timeout: DEFAULT_HANDLER_TIMEOUT,
        }
    }

    /// Exposes `handle` on GET /metrics.
    #[must_use]
    pub fn with_metrics(mut self, handle: Arc<PrometheusHandle>) -> Self {
        self.metrics = Some(handle);
        self
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    #[must_use]
    pub fn with_handler_timeout(mut self, handler_timeout: Duration) -> Self {
        self.handler_timeout = handler_timeout;
        self
    }
}
