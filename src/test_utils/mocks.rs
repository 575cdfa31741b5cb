//! Mock implementations for testing.
//!
//! These mocks provide in-memory implementations of domain traits
//! that can be configured to simulate various scenarios including
//! success, failure, and slow gateways.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::{
    HttpTransport, PaymentEventHandler, SagaPayError, TransportError, TransportRequest,
    TransportResponse, WebhookPayload,
};

/// Configuration for mock behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// If true, operations will fail.
    pub should_fail: bool,
    /// Custom error message for failures.
    pub error_message: Option<String>,
    /// Simulated latency before each call completes.
    pub latency: Option<Duration>,
}

impl MockConfig {
    /// Creates a config that always succeeds.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// Creates a config that always fails.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
            latency: None,
        }
    }

    /// Adds simulated latency.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

/// Mock HTTP transport for testing the gateway client.
///
/// Replies are served in the order they were queued; every request is
/// recorded so tests can assert on method, URL, headers and body.
///
/// # Example
///
/// ```ignore
/// use sagapay::test_utils::MockTransport;
///
/// let transport = MockTransport::new();
/// transport.push_json(200, serde_json::json!({"id": "w1", "status": "PENDING", "fee": "0.1"}));
/// ```
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
    config: MockConfig,
    call_count: AtomicU64,
}

impl MockTransport {
    /// Creates a new mock with default (success) configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a new mock with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            config,
            call_count: AtomicU64::new(0),
        }
    }

    /// Creates a mock whose every send fails with a connection error.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Delays every reply by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.config.latency = Some(latency);
        self
    }

    /// Queues a JSON reply.
    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push_response(status, &body.to_string());
    }

    /// Queues a raw reply.
    pub fn push_response(&self, status: u16, body: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(TransportResponse::new(status, body.as_bytes().to_vec())));
    }

    /// Queues a transport failure.
    pub fn push_error(&self, error: TransportError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Gets the number of times `send` was called.
    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.requests.lock().unwrap().push(request);
        self.config.simulate_latency().await;

        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock transport error".to_string());
            return Err(TransportError::Connection(msg));
        }

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no mock reply queued".to_string())))
    }
}

/// Event handler that records every payload it receives.
pub struct RecordingEventHandler {
    payloads: Arc<Mutex<Vec<WebhookPayload>>>,
    config: MockConfig,
}

impl RecordingEventHandler {
    /// Creates a handler that accepts every notification.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    /// Creates a new handler with the given configuration.
    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            payloads: Arc::new(Mutex::new(Vec::new())),
            config,
        }
    }

    /// Creates a handler that records and then fails.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Payloads received so far.
    pub fn payloads(&self) -> Vec<WebhookPayload> {
        self.payloads.lock().unwrap().clone()
    }

    /// Gets the number of notifications handled.
    pub fn call_count(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }
}

impl Default for RecordingEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentEventHandler for RecordingEventHandler {
    async fn on_payment(&self, payload: &WebhookPayload) -> Result<(), SagaPayError> {
        self.config.simulate_latency().await;
        self.payloads.lock().unwrap().push(payload.clone());

        if self.config.should_fail {
            let msg = self
                .config
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock handler error".to_string());
            return Err(SagaPayError::Internal(msg));
        }
        Ok(())
    }
}
