//! Reqwest-backed implementation of [`HttpTransport`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::domain::{
    ConfigError, HttpMethod, HttpTransport, TransportError, TransportRequest, TransportResponse,
};

/// Configuration for the reqwest transport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("sagapay-rust/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpTransportConfig {
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTPS transport over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    /// Create a transport with custom configuration
    pub fn new(config: &HttpTransportConfig) -> Result<Self, ConfigError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        debug!(timeout_ms = config.timeout.as_millis() as u64, "Created reqwest transport");
        Ok(Self { http_client })
    }

    /// Create a transport with default configuration
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::new(&HttpTransportConfig::default())
    }

    /// Wrap an existing client, e.g. one shared with the rest of the application.
    #[must_use]
    pub fn from_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = request.method.as_str(), path = request.url.path()))]
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.http_client.get(request.url),
            HttpMethod::Post => self.http_client.post(request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        debug!(status, body_len = body.len(), "Gateway responded");

        Ok(TransportResponse::new(status, body.to_vec()))
    }
}
