//! Domain layer containing gateway types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{
    ApiError, ConfigError, SagaPayError, TransportError, ValidationError, WebhookError,
};
pub use traits::{
    HttpMethod, HttpTransport, PaymentEventHandler, TransportRequest, TransportResponse,
};
pub use types::{
    AddressType, Balance, CreateDepositParams, CreateWithdrawalParams, DepositResponse,
    NATIVE_ASSET, NetworkType, Token, Transaction, TransactionStatus, TransactionStatusResponse,
    TransactionType, WalletBalanceResponse, WebhookAck, WebhookPayload, WithdrawalResponse,
};
