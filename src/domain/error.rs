//! Error types for the gateway client and the webhook receiver.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingCredential(&'static str),
    #[error("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("HTTP client construction failed: {0}")]
    HttpClient(String),
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Validation failed: {0}")]
    Multiple(String),
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = err
            .field_errors()
            .into_keys()
            .map(|field| wire_field_name(&field))
            .collect();
        fields.sort();

        match fields.as_slice() {
            [field] => ValidationError::MissingField(field.clone()),
            _ => ValidationError::Multiple(fields.join(", ")),
        }
    }
}

/// `ipn_url` -> `ipnUrl`, matching the JSON field the gateway expects.
fn wire_field_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            name.extend(c.to_uppercase());
            upper_next = false;
        } else {
            name.push(c);
        }
    }
    name
}

/// Failures below the HTTP semantics layer, plus error statuses whose body
/// could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Request cancelled")]
    Cancelled,
    #[error("HTTP request failed: {0}")]
    Request(String),
    #[error("HTTP error: {0} - failed to parse error response")]
    UnexpectedStatus(u16),
}

/// Structured error body returned by the gateway for 4xx/5xx responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code or category, e.g. `unauthorized`.
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
    /// Auxiliary data the gateway attached, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// HTTP status of the response; not part of the body.
    #[serde(skip)]
    pub status: u16,
}

impl ApiError {
    /// Decodes an error body and attaches the response status.
    ///
    /// Returns `None` when the body is not a JSON object.
    #[must_use]
    pub fn from_body(status: u16, body: &[u8]) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_slice(body).ok()?;
        if !value.is_object() {
            return None;
        }
        let mut api_error: ApiError = serde_json::from_value(value).ok()?;
        api_error.status = status;
        Some(api_error)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error: {} - {}", self.error, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Rejections produced while authenticating an inbound notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebhookError {
    #[error("missing SagaPay signature in headers")]
    MissingSignature,
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("failed to parse webhook payload: {0}")]
    Payload(String),
    #[error("failed to read request body: {0}")]
    Body(String),
}

#[derive(Error, Debug)]
pub enum SagaPayError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Webhook(#[from] WebhookError),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SagaPayError {
    /// The structured gateway error, if this is one.
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            SagaPayError::Api(err) => Some(err),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_api_error(&self) -> bool {
        matches!(self, SagaPayError::Api(_))
    }

    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(self, SagaPayError::Transport(_))
    }

    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, SagaPayError::Validation(_))
    }
}
