use crate::domain::amount::Amount;
use crate::domain::descriptor::PaymentDescriptor;
use crate::domain::instructions::{generate_instructions, generate_local_correlation_id};
use crate::domain::session::{Channel, PaymentSession, PaymentStatus};
use crate::error::{PaymentError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Handle returned by [`SessionStore::subscribe`], used to unsubscribe.
pub type ListenerId = u64;

type Listener = Box<dyn Fn(&Arc<PaymentSession>) + Send + Sync>;

struct State {
    session: Arc<PaymentSession>,
    generation: u64,
}

#[derive(Default)]
struct ListenerRegistry {
    next_id: ListenerId,
    listeners: HashMap<ListenerId, Listener>,
}

/// The single live payment attempt, mutated only through named transitions.
///
/// Cloning the store clones a handle to the same session; there is exactly
/// one attempt per store. Each transition swaps in a fresh immutable snapshot
/// and notifies every subscriber exactly once, synchronously, after the swap.
/// Readers hold `Arc<PaymentSession>` snapshots that never change in place.
///
/// Listeners run inline on the transitioning thread and must not invoke
/// transitions or subscribe/unsubscribe themselves.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<Mutex<State>>,
    listeners: Arc<Mutex<ListenerRegistry>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                session: Arc::new(PaymentSession::empty()),
                generation: 0,
            })),
            listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
        }
    }

    /// Current snapshot. Never mutates in place; transitions replace it.
    pub fn snapshot(&self) -> Arc<PaymentSession> {
        self.state.lock().unwrap().session.clone()
    }

    /// Supersession counter, bumped by `capture` and `reset`. In-flight work
    /// that recorded an earlier generation must discard its result.
    pub fn generation(&self) -> u64 {
        self.state.lock().unwrap().generation
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&Arc<PaymentSession>) + Send + Sync + 'static,
    ) -> ListenerId {
        let mut registry = self.listeners.lock().unwrap();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.insert(id, Box::new(listener));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.lock().unwrap().listeners.remove(&id).is_some()
    }

    /// Begins a fresh attempt from a decoded descriptor.
    ///
    /// Always supersedes whatever came before: channel, instructions, status
    /// and identifiers are cleared, and the amount is seeded from the
    /// descriptor when it embeds one.
    pub fn capture(&self, descriptor: PaymentDescriptor) -> Arc<PaymentSession> {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.generation += 1;
            tracing::debug!(
                payee = descriptor.payee_identifier(),
                generation = state.generation,
                "captured payment descriptor"
            );
            state.session = Arc::new(PaymentSession {
                amount: descriptor.amount(),
                descriptor: Some(descriptor),
                ..PaymentSession::empty()
            });
            state.session.clone()
        };
        self.notify(&snapshot);
        snapshot
    }

    /// Sets the authoritative amount for the attempt. Bounds are enforced by
    /// the [`Amount`] type; a manual entry may override a descriptor-embedded
    /// amount.
    pub fn set_amount(&self, amount: Amount) -> Arc<PaymentSession> {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            let mut session = (*state.session).clone();
            session.amount = Some(amount);
            state.session = Arc::new(session);
            state.session.clone()
        };
        self.notify(&snapshot);
        snapshot
    }

    /// Confirms the attempt over `channel`: generates the local correlation
    /// id and the instruction steps, stores the optional remote transaction
    /// id, and moves the status to `confirmed`.
    ///
    /// Requires a captured descriptor and an amount; calling it earlier is a
    /// sequencing bug in the caller.
    pub fn confirm(
        &self,
        channel: Channel,
        remote_transaction_id: Option<String>,
    ) -> Result<Arc<PaymentSession>> {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            debug_assert!(
                state.session.descriptor.is_some() && state.session.amount.is_some(),
                "confirm called before capture/amount entry"
            );
            let (Some(descriptor), Some(amount)) =
                (state.session.descriptor.as_ref(), state.session.amount)
            else {
                return Err(PaymentError::Precondition(
                    "confirm requires a captured descriptor and an amount",
                ));
            };

            let instructions = generate_instructions(channel, descriptor.payee_identifier(), amount);
            let mut session = (*state.session).clone();
            session.local_correlation_id = Some(generate_local_correlation_id());
            session.remote_transaction_id = remote_transaction_id;
            session.channel = Some(channel);
            session.instructions = Some(instructions);
            session.status = Some(PaymentStatus::Confirmed);
            state.session = Arc::new(session);
            tracing::debug!(%channel, "payment attempt confirmed");
            state.session.clone()
        };
        self.notify(&snapshot);
        Ok(snapshot)
    }

    /// Records a status reported by the remote source.
    ///
    /// Valid any number of times while the status is non-terminal; the remote
    /// source is trusted over a strict forward lattice. Terminal status is
    /// sticky: once `success` or `failed` is recorded, further updates mutate
    /// nothing and return [`PaymentError::TerminalStatus`].
    pub fn update_status(&self, status: PaymentStatus) -> Result<Arc<PaymentSession>> {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            let Some(current) = state.session.status else {
                return Err(PaymentError::Precondition(
                    "status update requires a confirmed session",
                ));
            };
            if current.is_terminal() {
                return Err(PaymentError::TerminalStatus(current));
            }

            let mut session = (*state.session).clone();
            session.status = Some(status);
            state.session = Arc::new(session);
            tracing::debug!(from = %current, to = %status, "payment status updated");
            state.session.clone()
        };
        self.notify(&snapshot);
        Ok(snapshot)
    }

    /// Unconditionally ends the attempt, clearing every field.
    pub fn reset(&self) -> Arc<PaymentSession> {
        let snapshot = {
            let mut state = self.state.lock().unwrap();
            state.generation += 1;
            state.session = Arc::new(PaymentSession::empty());
            tracing::debug!(generation = state.generation, "payment session reset");
            state.session.clone()
        };
        self.notify(&snapshot);
        snapshot
    }

    fn notify(&self, snapshot: &Arc<PaymentSession>) {
        let registry = self.listeners.lock().unwrap();
        for listener in registry.listeners.values() {
            listener(snapshot);
        }
    }
}
