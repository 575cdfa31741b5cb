//! HTTP transport implementations.

pub mod transport;

pub use transport::{HttpTransportConfig, ReqwestTransport};
