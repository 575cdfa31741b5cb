//! Application layer: the gateway client, the webhook verifier and the
//! receiver's shared state.

pub mod client;
pub mod context;
pub mod events;
pub mod state;
pub mod webhook;

pub use client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, SagaPayClient};
pub use context::CallContext;
pub use events::LoggingEventHandler;
pub use state::{AppState, DEFAULT_HANDLER_TIMEOUT};
pub use webhook::{DEFAULT_MAX_BODY_BYTES, SIGNATURE_HEADER, WebhookVerifier};
