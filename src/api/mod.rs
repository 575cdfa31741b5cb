//! HTTP surface of the webhook receiver.

pub mod config;
pub mod handlers;
pub mod router;

pub use config::ReceiverConfig;
pub use router::{RouterConfig, create_router, create_router_with_config};
