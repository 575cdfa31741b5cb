//! SagaPay gateway API client.
//!
//! Every call goes through one authenticated request path: credentials travel
//! as the `x-api-key` / `x-api-secret` headers, error statuses are decoded
//! into [`ApiError`], and nothing is retried.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::context::CallContext;
use crate::domain::{
    ApiError, ConfigError, CreateDepositParams, CreateWithdrawalParams, DepositResponse,
    HttpMethod, HttpTransport, NetworkType, SagaPayError, TransactionStatusResponse,
    TransactionType, TransportError, TransportRequest, ValidationError, WalletBalanceResponse,
    WithdrawalResponse,
};
use crate::infra::observability::REQUESTS_TOTAL;
use crate::infra::{HttpTransportConfig, ReqwestTransport};

/// Production gateway endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.sagapay.net";

/// Transport timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const API_KEY_HEADER: &str = "x-api-key";
pub const API_SECRET_HEADER: &str = "x-api-secret";

const CREATE_DEPOSIT_PATH: &str = "/create-deposit";
const CREATE_WITHDRAWAL_PATH: &str = "/create-withdrawal";
const CHECK_TRANSACTION_STATUS_PATH: &str = "/check-transaction-status";
const FETCH_WALLET_BALANCE_PATH: &str = "/fetch-wallet-balance";

/// Construction options for [`SagaPayClient`].
#[derive(Debug)]
pub struct ClientConfig {
    /// Overrides [`DEFAULT_BASE_URL`] when set and non-empty.
    pub base_url: Option<String>,
    pub api_key: SecretString,
    pub api_secret: SecretString,
    /// Transport timeout; ignored when a transport is injected.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            base_url: None,
            api_key: SecretString::from(api_key.into()),
            api_secret: SecretString::from(api_secret.into()),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn effective_timeout(&self) -> Duration {
        self.timeout.filter(|t| !t.is_zero()).unwrap_or(DEFAULT_TIMEOUT)
    }
}

struct ClientInner {
    transport: Arc<dyn HttpTransport>,
    base_url: Url,
    api_key: SecretString,
    api_secret: SecretString,
}

/// Authenticated client for the SagaPay gateway.
///
/// Immutable after construction and cheap to clone; clones share the
/// transport and its connection pool, so one instance can serve concurrent
/// callers.
///
/// # Example
///
/// ```ignore
/// let client = SagaPayClient::new(ClientConfig::new("your-api-key", "your-api-secret"))?;
/// let ctx = CallContext::background().with_timeout(Duration::from_secs(30));
///
/// let params = CreateDepositParams::new(NetworkType::Bep20, NATIVE_ASSET, "1.5", "https://yourwebsite.com/webhook")
///     .with_udf("order-123")
///     .with_address_type(AddressType::Temporary);
/// let deposit = client.create_deposit(&ctx, &params).await?;
/// ```
#[derive(Clone)]
pub struct SagaPayClient {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for SagaPayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SagaPayClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl SagaPayClient {
    /// Creates a client backed by a [`ReqwestTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a credential is empty, the base URL is not
    /// an absolute URL, or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let transport_config = HttpTransportConfig::default().with_timeout(config.effective_timeout());
        let transport = ReqwestTransport::new(&transport_config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client that sends requests through `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a credential is empty or the base URL is not
    /// an absolute URL.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, ConfigError> {
        if config.api_key.expose_secret().is_empty() {
            return Err(ConfigError::MissingCredential("API key"));
        }
        if config.api_secret.expose_secret().is_empty() {
            return Err(ConfigError::MissingCredential("API secret"));
        }

        let base_url = parse_base_url(config.base_url.as_deref())?;
        info!(base_url = %base_url, "Created SagaPay client");

        Ok(Self {
            inner: Arc::new(ClientInner {
                transport,
                base_url,
                api_key: config.api_key,
                api_secret: config.api_secret,
            }),
        })
    }

    /// Base URL every endpoint path is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Creates a deposit address for receiving cryptocurrency.
    ///
    /// # Errors
    ///
    /// Returns [`SagaPayError::Validation`] before any network I/O if a
    /// required parameter is empty, otherwise the transport, API or decode
    /// error of the call.
    #[instrument(skip(self, ctx, params), fields(network = %params.network_type))]
    pub async fn create_deposit(
        &self,
        ctx: &CallContext,
        params: &CreateDepositParams,
    ) -> Result<DepositResponse, SagaPayError> {
        params.check().inspect_err(|e| {
            warn!(error = %e, "Rejected deposit parameters");
        })?;
        self.post(ctx, CREATE_DEPOSIT_PATH, params).await
    }

    /// Creates a withdrawal to an external address.
    ///
    /// # Errors
    ///
    /// Same contract as [`SagaPayClient::create_deposit`].
    #[instrument(skip(self, ctx, params), fields(network = %params.network_type))]
    pub async fn create_withdrawal(
        &self,
        ctx: &CallContext,
        params: &CreateWithdrawalParams,
    ) -> Result<WithdrawalResponse, SagaPayError> {
        params.check().inspect_err(|e| {
            warn!(error = %e, "Rejected withdrawal parameters");
        })?;
        self.post(ctx, CREATE_WITHDRAWAL_PATH, params).await
    }

    /// Lists the transactions of one type seen for `address`.
    ///
    /// # Errors
    ///
    /// Returns [`SagaPayError::Validation`] if `address` is empty, otherwise
    /// the transport, API or decode error of the call.
    #[instrument(skip(self, ctx))]
    pub async fn check_transaction_status(
        &self,
        ctx: &CallContext,
        address: &str,
        transaction_type: TransactionType,
    ) -> Result<TransactionStatusResponse, SagaPayError> {
        require_address(address)?;
        let query = [("address", address), ("type", transaction_type.as_str())];
        self.get(ctx, CHECK_TRANSACTION_STATUS_PATH, &query).await
    }

    /// Fetches the balance of `address` for a token, or for the native coin
    /// when `contract_address` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SagaPayError::Validation`] if `address` is empty, otherwise
    /// the transport, API or decode error of the call.
    #[instrument(skip(self, ctx))]
    pub async fn fetch_wallet_balance(
        &self,
        ctx: &CallContext,
        address: &str,
        network_type: NetworkType,
        contract_address: &str,
    ) -> Result<WalletBalanceResponse, SagaPayError> {
        require_address(address)?;
        let mut query = vec![("address", address), ("networkType", network_type.as_str())];
        if !contract_address.is_empty() {
            query.push(("contractAddress", contract_address));
        }
        self.get(ctx, FETCH_WALLET_BALANCE_PATH, &query).await
    }

    async fn post<B, R>(&self, ctx: &CallContext, endpoint: &'static str, body: &B) -> Result<R, SagaPayError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_vec(body).map_err(|e| SagaPayError::Serialization(e.to_string()))?;
        self.execute(ctx, HttpMethod::Post, endpoint, &[], Some(body)).await
    }

    async fn get<R>(
        &self,
        ctx: &CallContext,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> Result<R, SagaPayError>
    where
        R: DeserializeOwned,
    {
        self.execute(ctx, HttpMethod::Get, endpoint, query, None).await
    }

    /// Sends one authenticated request and decodes the response.
    async fn execute<R>(
        &self,
        ctx: &CallContext,
        method: HttpMethod,
        endpoint: &'static str,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> Result<R, SagaPayError>
    where
        R: DeserializeOwned,
    {
        let request = self.build_request(method, endpoint, query, body)?;
        debug!(method = method.as_str(), url = %request.url, "Sending gateway request");

        let response = match ctx.run(self.inner.transport.send(request)).await {
            Ok(response) => response,
            Err(e) => {
                warn!(endpoint, error = %e, "Gateway request failed");
                record_outcome(endpoint, "transport_error");
                return Err(e.into());
            }
        };

        if response.is_error() {
            return Err(match ApiError::from_body(response.status, &response.body) {
                Some(api_error) => {
                    warn!(endpoint, status = response.status, code = %api_error.error, "Gateway returned an error");
                    record_outcome(endpoint, "api_error");
                    api_error.into()
                }
                None => {
                    warn!(endpoint, status = response.status, "Gateway returned an unreadable error body");
                    record_outcome(endpoint, "transport_error");
                    TransportError::UnexpectedStatus(response.status).into()
                }
            });
        }

        let decoded = serde_json::from_slice(&response.body).map_err(|e| {
            warn!(endpoint, error = %e, "Failed to decode gateway response");
            record_outcome(endpoint, "decode_error");
            SagaPayError::Decode(e.to_string())
        })?;
        record_outcome(endpoint, "success");
        Ok(decoded)
    }

    fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> Result<TransportRequest, SagaPayError> {
        let mut url = self
            .inner
            .base_url
            .join(endpoint)
            .map_err(|e| SagaPayError::Internal(format!("invalid endpoint {endpoint}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
            (
                API_KEY_HEADER.to_string(),
                self.inner.api_key.expose_secret().to_string(),
            ),
            (
                API_SECRET_HEADER.to_string(),
                self.inner.api_secret.expose_secret().to_string(),
            ),
        ];

        Ok(TransportRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

fn parse_base_url(base_url: Option<&str>) -> Result<Url, ConfigError> {
    let raw = base_url.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_BASE_URL);
    let invalid = |message: String| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        message,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("must be an absolute URL with a host".to_string()));
    }
    Ok(url)
}

fn require_address(address: &str) -> Result<(), ValidationError> {
    if address.is_empty() {
        warn!("Rejected empty address");
        return Err(ValidationError::MissingField("address".to_string()));
    }
    Ok(())
}

fn record_outcome(endpoint: &'static str, outcome: &'static str) {
    metrics::counter!(REQUESTS_TOTAL, "endpoint" => endpoint, "outcome" => outcome).increment(1);
}
