//! Infrastructure layer implementations.

pub mod http;
pub mod observability;

pub use http::{HttpTransportConfig, ReqwestTransport};
pub use observability::{PrometheusHandle, init_metrics, init_metrics_handle, init_tracing};
