//! Default handling of verified payment notifications.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::{PaymentEventHandler, SagaPayError, TransactionStatus, WebhookPayload};

/// Handler that only records each notification in the log.
///
/// Used by the receiver binary until the merchant plugs in their own
/// [`PaymentEventHandler`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventHandler;

#[async_trait]
impl PaymentEventHandler for LoggingEventHandler {
    async fn on_payment(&self, payload: &WebhookPayload) -> Result<(), SagaPayError> {
        let id = payload.id.as_str();
        let udf = payload.udf.as_deref().unwrap_or_default();

        match payload.status {
            TransactionStatus::Completed => info!(
                notification_id = %id,
                kind = %payload.transaction_type,
                amount = %payload.amount,
                network = %payload.network_type,
                tx_hash = payload.tx_hash.as_deref().unwrap_or_default(),
                udf,
                "Transaction completed"
            ),
            TransactionStatus::Failed => warn!(
                notification_id = %id,
                kind = %payload.transaction_type,
                amount = %payload.amount,
                udf,
                "Transaction failed"
            ),
            TransactionStatus::Pending | TransactionStatus::Processing => info!(
                notification_id = %id,
                status = %payload.status,
                kind = %payload.transaction_type,
                amount = %payload.amount,
                udf,
                "Transaction in progress"
            ),
            TransactionStatus::Cancelled => info!(
                notification_id = %id,
                kind = %payload.transaction_type,
                amount = %payload.amount,
                udf,
                "Transaction cancelled"
            ),
        }
        Ok(())
    }
}
