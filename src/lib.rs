//! SagaPay
//!
//! Client library for the SagaPay blockchain payment gateway plus the
//! verifier and HTTP receiver for its instant payment notifications.
//!
//! # Architecture Overview
//!
//! This crate is organized into four main layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   API Layer                  │
//! │   Webhook receiver: routing, config, acks    │
//! ├─────────────────────────────────────────────┤
//! │               Application Layer              │
//! │  Gateway client, call context, verification  │
//! ├─────────────────────────────────────────────┤
//! │                 Domain Layer                 │
//! │   Wire types, traits, errors (no I/O)        │
//! ├─────────────────────────────────────────────┤
//! │             Infrastructure Layer             │
//! │   reqwest transport, tracing, Prometheus     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Key Features
//!
//! - **Trait-based abstraction**: HTTP goes through [`domain::HttpTransport`], payment
//!   side effects through [`domain::PaymentEventHandler`]
//! - **Cancellation**: every gateway call takes an [`app::CallContext`]
//! - **Authenticity**: HMAC-SHA256 webhook signatures compared in constant time
//! - **Validation**: Parameter checks using the `validator` crate before any I/O
//! - **Logging**: Structured logging with `tracing`
//! - **Security**: Credentials and webhook secret held in `secrecy` types
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use sagapay::app::{CallContext, ClientConfig, SagaPayClient};
//! use sagapay::domain::{CreateWithdrawalParams, NetworkType};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SagaPayClient::new(ClientConfig::new("your-api-key", "your-api-secret"))?;
//!     let ctx = CallContext::background().with_timeout(Duration::from_secs(30));
//!
//!     let params = CreateWithdrawalParams::new(
//!         NetworkType::Erc20,
//!         "0xdAC17F958D2ee523a2206206994597C13D831ec7",
//!         "0x742d35Cc6634C0532925a3b844Bc454e4438f44e",
//!         "10.5",
//!         "https://yourwebsite.com/webhook",
//!     )
//!     .with_udf("withdrawal-456");
//!     let withdrawal = client.create_withdrawal(&ctx, &params).await?;
//!     println!("withdrawal {} is {}", withdrawal.id, withdrawal.status);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod app;
pub mod domain;
pub mod infra;

// Test utilities are available in tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
