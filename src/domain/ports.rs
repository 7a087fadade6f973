use crate::domain::amount::Amount;
use crate::domain::session::{Channel, PaymentStatus};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::SystemTime;

/// Status returned by the remote status collaborator for one poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: PaymentStatus,
    pub updated_at: SystemTime,
}

impl StatusReport {
    pub fn now(status: PaymentStatus) -> Self {
        Self {
            status,
            updated_at: SystemTime::now(),
        }
    }
}

/// Remote status collaborator: resolves a remote transaction identifier to
/// its current status. A fetch failure means "try again next interval", never
/// a fatal session error.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, remote_transaction_id: &str) -> Result<StatusReport>;
}

/// Optional transaction-creation collaborator used at confirm time. The
/// session works without it, falling back to the local correlation id only.
#[async_trait]
pub trait TransactionGateway: Send + Sync {
    async fn create_transaction(
        &self,
        payee_identifier: &str,
        amount: Amount,
        channel: Channel,
    ) -> Result<String>;
}

/// Shared handle to a status source; the engine and the poller both hold one.
pub type StatusSourceHandle = Arc<dyn StatusSource>;

/// Shared handle to a transaction gateway.
pub type TransactionGatewayHandle = Arc<dyn TransactionGateway>;
