use crate::application::poller::StatusPoller;
use crate::application::store::{ListenerId, SessionStore};
use crate::domain::amount::Amount;
use crate::domain::descriptor::{self, PaymentDescriptor};
use crate::domain::ports::{StatusSourceHandle, TransactionGatewayHandle};
use crate::domain::session::{Channel, PaymentSession};
use crate::error::{PaymentError, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default period between remote status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// The main entry point for driving one assisted payment attempt.
///
/// `PaymentEngine` owns the session store, the status source, the optional
/// transaction gateway, and at most one live status poller. UI layers call
/// its methods in sequence (capture, amount entry, confirm, polling) and
/// observe progress through the store's subscription interface.
pub struct PaymentEngine {
    store: SessionStore,
    status_source: StatusSourceHandle,
    gateway: Option<TransactionGatewayHandle>,
    poll_interval: Duration,
    poller: Mutex<Option<StatusPoller>>,
}

impl PaymentEngine {
    /// Creates an engine around a status source, with no transaction gateway
    /// and the default poll interval.
    pub fn new(status_source: StatusSourceHandle) -> Self {
        Self {
            store: SessionStore::new(),
            status_source,
            gateway: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poller: Mutex::new(None),
        }
    }

    /// Attaches the optional transaction-creation collaborator.
    pub fn with_gateway(mut self, gateway: TransactionGatewayHandle) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn snapshot(&self) -> Arc<PaymentSession> {
        self.store.snapshot()
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&Arc<PaymentSession>) + Send + Sync + 'static,
    ) -> ListenerId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Decodes a raw scanned or pasted string and starts a fresh attempt.
    ///
    /// A decode failure leaves the current session untouched. A successful
    /// capture supersedes any prior attempt, cancelling its poller.
    pub fn capture_raw(&self, raw: &str) -> Result<Arc<PaymentSession>> {
        let decoded = descriptor::decode(raw)?;
        Ok(self.capture(decoded))
    }

    /// Starts a fresh attempt from an already-decoded descriptor.
    pub fn capture(&self, descriptor: PaymentDescriptor) -> Arc<PaymentSession> {
        self.stop_polling();
        self.store.capture(descriptor)
    }

    /// Validates user-entered amount text and stores it on the session.
    pub fn enter_amount(&self, text: &str) -> Result<Arc<PaymentSession>> {
        let amount = Amount::parse(text)?;
        Ok(self.store.set_amount(amount))
    }

    /// Confirms the attempt over `channel`.
    ///
    /// When a transaction gateway is configured it is asked for a remote
    /// transaction id first; a gateway failure degrades to a local-only
    /// confirmation rather than failing the attempt. Without a remote id the
    /// session cannot be polled and is tracked by its correlation id alone.
    pub async fn confirm(&self, channel: Channel) -> Result<Arc<PaymentSession>> {
        let snapshot = self.store.snapshot();
        let (Some(descriptor), Some(amount)) = (snapshot.descriptor.as_ref(), snapshot.amount)
        else {
            return Err(PaymentError::Precondition(
                "confirm requires a captured descriptor and an amount",
            ));
        };

        let remote_id = match &self.gateway {
            Some(gateway) => {
                match gateway
                    .create_transaction(descriptor.payee_identifier(), amount, channel)
                    .await
                {
                    Ok(id) => Some(id),
                    Err(err) => {
                        tracing::warn!(
                            error = %err,
                            "transaction gateway unavailable, confirming with local correlation id only"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        self.store.confirm(channel, remote_id)
    }

    /// Starts the recurring status check for the confirmed attempt,
    /// replacing any live poller. Returns `false` when there is nothing to
    /// poll: no remote transaction id, or an already-terminal status.
    pub fn start_status_polling(&self) -> bool {
        let mut slot = self.poller.lock().unwrap();
        if let Some(active) = slot.take() {
            active.stop();
        }
        match StatusPoller::spawn(
            self.store.clone(),
            self.status_source.clone(),
            self.poll_interval,
        ) {
            Some(poller) => {
                *slot = Some(poller);
                true
            }
            None => false,
        }
    }

    /// Cancels the live poller, if any. Idempotent.
    pub fn stop_polling(&self) {
        if let Some(poller) = self.poller.lock().unwrap().take() {
            poller.stop();
        }
    }

    /// Abandons the attempt: cancels polling and clears the session.
    pub fn reset(&self) {
        self.stop_polling();
        self.store.reset();
    }
}
