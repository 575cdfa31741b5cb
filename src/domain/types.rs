//! Gateway value types shared by the API client and the webhook receiver.
//!
//! Amounts and balances stay as strings end to end: the gateway sends decimal
//! strings and the client passes them through byte-for-byte.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::ValidationError;

/// Contract address sentinel for the chain's native asset (ETH, BNB, TRX, ...).
pub const NATIVE_ASSET: &str = "0";

/// Blockchain network a deposit, withdrawal or balance refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NetworkType {
    #[serde(rename = "ERC20")]
    Erc20,
    #[serde(rename = "BEP20")]
    Bep20,
    #[serde(rename = "TRC20")]
    Trc20,
    #[serde(rename = "POLYGON")]
    Polygon,
    #[serde(rename = "SOLANA")]
    Solana,
}

impl NetworkType {
    pub const ALL: [NetworkType; 5] = [
        NetworkType::Erc20,
        NetworkType::Bep20,
        NetworkType::Trc20,
        NetworkType::Polygon,
        NetworkType::Solana,
    ];

    /// Wire representation used in JSON bodies and query strings.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Erc20 => "ERC20",
            NetworkType::Bep20 => "BEP20",
            NetworkType::Trc20 => "TRC20",
            NetworkType::Polygon => "POLYGON",
            NetworkType::Solana => "SOLANA",
        }
    }
}

/// Direction of a gateway transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Deposit, TransactionType::Withdrawal];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
        }
    }
}

/// Gateway-reported transaction status.
///
/// The gateway moves a transaction `PENDING -> PROCESSING` and then into one
/// of the terminal states. The client only reflects what it is told and never
/// checks transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 5] = [
        TransactionStatus::Pending,
        TransactionStatus::Processing,
        TransactionStatus::Completed,
        TransactionStatus::Failed,
        TransactionStatus::Cancelled,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Processing => "PROCESSING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
            TransactionStatus::Cancelled => "CANCELLED",
        }
    }

    /// Whether no further status change is expected.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed | TransactionStatus::Failed | TransactionStatus::Cancelled
        )
    }
}

/// Lifetime hint for a generated deposit address.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum AddressType {
    Temporary,
    Permanent,
}

impl AddressType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Temporary => "TEMPORARY",
            AddressType::Permanent => "PERMANENT",
        }
    }
}

macro_rules! wire_enum_impls {
    ($ty:ident, $name:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                serde_json::from_value(serde_json::Value::String(s.to_string())).map_err(|_| {
                    ValidationError::InvalidField {
                        field: $name.to_string(),
                        message: format!("unknown value '{s}'"),
                    }
                })
            }
        }
    };
}

wire_enum_impls!(NetworkType, "networkType");
wire_enum_impls!(TransactionType, "type");
wire_enum_impls!(TransactionStatus, "status");
wire_enum_impls!(AddressType, "type");

/// Parameters for `POST /create-deposit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepositParams {
    pub network_type: NetworkType,
    /// Token contract, or [`NATIVE_ASSET`] for the chain's native coin.
    #[validate(length(min = 1))]
    pub contract_address: String,
    #[validate(length(min = 1))]
    pub amount: String,
    #[validate(length(min = 1))]
    pub ipn_url: String,
    /// Opaque merchant value echoed back in notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udf: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<AddressType>,
}

impl CreateDepositParams {
    pub fn new(
        network_type: NetworkType,
        contract_address: impl Into<String>,
        amount: impl Into<String>,
        ipn_url: impl Into<String>,
    ) -> Self {
        Self {
            network_type,
            contract_address: contract_address.into(),
            amount: amount.into(),
            ipn_url: ipn_url.into(),
            udf: None,
            address_type: None,
        }
    }

    #[must_use]
    pub fn with_udf(mut self, udf: impl Into<String>) -> Self {
        self.udf = Some(udf.into());
        self
    }

    #[must_use]
    pub fn with_address_type(mut self, address_type: AddressType) -> Self {
        self.address_type = Some(address_type);
        self
    }

    /// Checks that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the missing field(s).
    pub fn check(&self) -> Result<(), ValidationError> {
        self.validate().map_err(ValidationError::from)
    }
}

/// Parameters for `POST /create-withdrawal`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWithdrawalParams {
    pub network_type: NetworkType,
    #[validate(length(min = 1))]
    pub contract_address: String,
    /// Destination wallet.
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub amount: String,
    #[validate(length(min = 1))]
    pub ipn_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udf: Option<String>,
}

impl CreateWithdrawalParams {
    pub fn new(
        network_type: NetworkType,
        contract_address: impl Into<String>,
        address: impl Into<String>,
        amount: impl Into<String>,
        ipn_url: impl Into<String>,
    ) -> Self {
        Self {
            network_type,
            contract_address: contract_address.into(),
            address: address.into(),
            amount: amount.into(),
            ipn_url: ipn_url.into(),
            udf: None,
        }
    }

    #[must_use]
    pub fn with_udf(mut self, udf: impl Into<String>) -> Self {
        self.udf = Some(udf.into());
        self
    }

    /// Checks that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the missing field(s).
    pub fn check(&self) -> Result<(), ValidationError> {
        self.validate().map_err(ValidationError::from)
    }
}

/// Response of `POST /create-deposit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DepositResponse {
    pub id: String,
    pub address: String,
    pub expires_at: DateTime<Utc>,
    pub amount: String,
    pub status: TransactionStatus,
}

/// Response of `POST /create-withdrawal`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WithdrawalResponse {
    pub id: String,
    pub status: TransactionStatus,
    pub fee: String,
}

/// Token metadata attached to transactions and balances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub network_type: NetworkType,
    pub contract_address: String,
    pub symbol: String,
    pub name: String,
    pub decimals: u32,
}

/// Server-side record of a deposit or withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub amount: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub network_type: NetworkType,
    pub contract_address: String,
    pub address: String,
    pub token: Token,
}

/// Response of `GET /check-transaction-status`.
///
/// `transactions` keeps the order the gateway returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatusResponse {
    pub address: String,
    pub transaction_type: TransactionType,
    pub count: u64,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Raw (smallest unit) and human-formatted balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balance {
    pub raw: String,
    pub formatted: String,
}

/// Response of `GET /fetch-wallet-balance`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalanceResponse {
    pub address: String,
    pub network_type: NetworkType,
    pub contract_address: String,
    pub token: Token,
    pub balance: Balance,
}

/// Body of an instant payment notification pushed by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub address: String,
    pub network_type: NetworkType,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Acknowledgement body returned to the gateway for every notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookAck {
    #[must_use]
    pub fn success() -> Self {
        Self {
            received: true,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            received: false,
            error: Some(message.into()),
        }
    }
}
