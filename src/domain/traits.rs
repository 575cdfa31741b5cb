//! Domain traits defining contracts for external systems.

use std::fmt;

use async_trait::async_trait;
use url::Url;

use super::error::{SagaPayError, TransportError};
use super::types::WebhookPayload;

/// Headers whose values are credentials and must never be printed.
const REDACTED_HEADERS: [&str; 2] = ["x-api-key", "x-api-secret"];

/// HTTP method used by the gateway endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A fully resolved outbound request.
#[derive(Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    /// Returns the first value of a header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the value of a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

impl fmt::Debug for TransportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(key, value)| {
                if REDACTED_HEADERS.iter().any(|h| key.eq_ignore_ascii_case(h)) {
                    (key.as_str(), "[REDACTED]")
                } else {
                    (key.as_str(), value.as_str())
                }
            })
            .collect();

        f.debug_struct("TransportRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

/// Status and raw body of a gateway response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Transport that executes gateway requests.
///
/// Implementations own connection reuse and their own per-request timeout;
/// they must not retry.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the response regardless of its status.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Merchant logic invoked for each authenticated notification.
#[async_trait]
pub trait PaymentEventHandler: Send + Sync {
    /// Handle a verified payment notification.
    async fn on_payment(&self, payload: &WebhookPayload) -> Result<(), SagaPayError>;
}
