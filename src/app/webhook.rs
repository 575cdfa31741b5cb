//! Authentication of inbound instant payment notifications.
//!
//! The gateway signs the raw request body with HMAC-SHA256 under the merchant's
//! secret and sends the lowercase hex digest in `x-sagapay-signature`. The body
//! is only decoded after that signature checks out, and it is verified exactly
//! as received.

use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{debug, instrument, warn};

use crate::domain::{WebhookError, WebhookPayload};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex HMAC-SHA256 of the raw body.
pub const SIGNATURE_HEADER: &str = "x-sagapay-signature";

/// Largest body [`WebhookVerifier::handle_request`] buffers.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Verifies and decodes gateway notifications.
///
/// Holds a single explicitly configured secret and no other state, so one
/// instance can be shared across request handlers.
pub struct WebhookVerifier {
    secret: SecretString,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier").finish_non_exhaustive()
    }
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::from(secret.into()),
        }
    }

    /// Lowercase hex HMAC-SHA256 of `body`, as the gateway sends it.
    #[must_use]
    pub fn sign(&self, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Whether `signature` is the signature of `body`.
    ///
    /// The comparison runs in constant time over the hex strings.
    #[must_use]
    pub fn verify_signature(&self, body: &[u8], signature: &str) -> bool {
        let expected = self.sign(body);
        expected.as_bytes().ct_eq(signature.as_bytes()).into()
    }

    /// Verifies `body` against `signature` and only then decodes it.
    ///
    /// # Errors
    ///
    /// [`WebhookError::InvalidSignature`] when the signature does not match
    /// (the body is not parsed), [`WebhookError::Payload`] when an
    /// authentic body is not a valid notification.
    #[instrument(skip_all, fields(body_len = body.len()))]
    pub fn process_webhook(
        &self,
        body: &[u8],
        signature: &str,
    ) -> Result<WebhookPayload, WebhookError> {
        if !self.verify_signature(body, signature) {
            warn!("Rejected webhook with invalid signature");
            return Err(WebhookError::InvalidSignature);
        }

        let payload: WebhookPayload = serde_json::from_slice(body).map_err(|e| {
            warn!(error = %e, "Authentic webhook body failed to decode");
            WebhookError::Payload(e.to_string())
        })?;

        debug!(
            notification_id = %payload.id,
            status = %payload.status,
            "Webhook verified"
        );
        Ok(payload)
    }

    /// Runs [`process_webhook`](Self::process_webhook) on already buffered
    /// request parts.
    ///
    /// # Errors
    ///
    /// [`WebhookError::MissingSignature`] when the header is absent or empty,
    /// [`WebhookError::InvalidSignature`] when it is not visible ASCII, plus
    /// everything `process_webhook` returns.
    pub fn handle_parts(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<WebhookPayload, WebhookError> {
        let value = headers
            .get(SIGNATURE_HEADER)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                warn!("Rejected webhook without signature header");
                WebhookError::MissingSignature
            })?;
        let signature = value.to_str().map_err(|_| {
            warn!("Rejected webhook with unreadable signature header");
            WebhookError::InvalidSignature
        })?;

        self.process_webhook(body, signature)
    }

    /// Authenticates a whole HTTP request, reading at most
    /// [`DEFAULT_MAX_BODY_BYTES`] of body.
    ///
    /// # Errors
    ///
    /// See [`handle_request_with_limit`](Self::handle_request_with_limit).
    pub async fn handle_request(
        &self,
        request: Request<Body>,
    ) -> Result<WebhookPayload, WebhookError> {
        self.handle_request_with_limit(request, DEFAULT_MAX_BODY_BYTES)
            .await
    }

    /// Authenticates a whole HTTP request.
    ///
    /// The signature header is checked before the body is read; the body
    /// bytes are verified untouched.
    ///
    /// # Errors
    ///
    /// [`WebhookError::MissingSignature`], [`WebhookError::Body`] if the body
    /// cannot be read within `limit` bytes, plus everything `process_webhook`
    /// returns.
    pub async fn handle_request_with_limit(
        &self,
        request: Request<Body>,
        limit: usize,
    ) -> Result<WebhookPayload, WebhookError> {
        let (parts, body) = request.into_parts();
        if !parts.headers.contains_key(SIGNATURE_HEADER) {
            warn!("Rejected webhook without signature header");
            return Err(WebhookError::MissingSignature);
        }

        let bytes = to_bytes(body, limit)
            .await
            .map_err(|e| WebhookError::Body(e.to_string()))?;
        self.handle_parts(&parts.headers, &bytes)
    }
}
