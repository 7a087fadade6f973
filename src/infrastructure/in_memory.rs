use crate::domain::amount::Amount;
use crate::domain::ports::{StatusReport, StatusSource, TransactionGateway};
use crate::domain::session::{Channel, PaymentStatus};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// One scripted answer from a [`ScriptedStatusSource`].
#[derive(Debug, Clone)]
pub enum ScriptedPoll {
    Respond(PaymentStatus),
    Fail(String),
}

/// Status source that replays a fixed script of poll answers.
///
/// Entries are consumed in order; the final entry repeats once the script is
/// exhausted. Used by the CLI driver and the poller tests in place of a real
/// remote collaborator.
pub struct ScriptedStatusSource {
    script: Mutex<VecDeque<ScriptedPoll>>,
    fetches: AtomicUsize,
}

impl ScriptedStatusSource {
    pub fn new(script: impl IntoIterator<Item = ScriptedPoll>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// A source that reports the same status on every poll.
    pub fn always(status: PaymentStatus) -> Self {
        Self::new([ScriptedPoll::Respond(status)])
    }

    /// Number of fetches performed so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for ScriptedStatusSource {
    async fn fetch_status(&self, _remote_transaction_id: &str) -> Result<StatusReport> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let entry = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        };

        match entry {
            Some(ScriptedPoll::Respond(status)) => Ok(StatusReport::now(status)),
            Some(ScriptedPoll::Fail(reason)) => Err(PaymentError::Remote(reason)),
            None => Err(PaymentError::Remote("status script is empty".to_string())),
        }
    }
}

/// Transaction gateway that hands out `rtx-<n>` identifiers from a counter.
#[derive(Default)]
pub struct SequentialGateway {
    counter: AtomicU64,
}

impl SequentialGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionGateway for SequentialGateway {
    async fn create_transaction(
        &self,
        _payee_identifier: &str,
        _amount: Amount,
        _channel: Channel,
    ) -> Result<String> {
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("rtx-{id}"))
    }
}
