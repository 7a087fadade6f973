use crate::application::store::SessionStore;
use crate::domain::ports::StatusSourceHandle;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Recurring remote-status check for the current payment attempt.
///
/// Polls the [`StatusSource`](crate::domain::ports::StatusSource) at a fixed
/// period and feeds each report through the store's `update_status`. The loop
/// stops itself when a terminal status arrives or the session is superseded;
/// fetch failures are skipped and retried at the next tick. At most one
/// poller should be live per session; the engine enforces that.
pub struct StatusPoller {
    handle: JoinHandle<()>,
}

impl StatusPoller {
    /// Spawns the polling task, or returns `None` when the session has no
    /// remote transaction id or is already terminal. The first poll fires one
    /// period after spawning.
    pub fn spawn(
        store: SessionStore,
        source: StatusSourceHandle,
        period: Duration,
    ) -> Option<StatusPoller> {
        let snapshot = store.snapshot();
        if snapshot.is_terminal() {
            return None;
        }
        let remote_id = snapshot.remote_transaction_id.clone()?;
        let generation = store.generation();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of `interval` completes immediately; consume it
            // so polls start one full period after spawn.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if store.generation() != generation {
                    tracing::debug!(%remote_id, "session superseded, stopping poller");
                    break;
                }

                match source.fetch_status(&remote_id).await {
                    Ok(report) => {
                        // The session may have been reset or re-captured
                        // while the fetch was in flight; a stale result is
                        // discarded, not applied.
                        if store.generation() != generation {
                            tracing::debug!(%remote_id, "discarding stale status poll result");
                            break;
                        }
                        match store.update_status(report.status) {
                            Ok(_) if report.status.is_terminal() => {
                                tracing::debug!(%remote_id, status = %report.status, "terminal status reached");
                                break;
                            }
                            Ok(_) => {}
                            // Terminal underneath us or session torn down.
                            Err(_) => break,
                        }
                    }
                    Err(err) => {
                        tracing::debug!(%remote_id, error = %err, "status poll failed, retrying next interval");
                    }
                }
            }
        });

        Some(StatusPoller { handle })
    }

    /// Cancels the polling task. Safe to call repeatedly and after the task
    /// has already finished on its own.
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::descriptor::decode;
    use crate::domain::session::{Channel, PaymentStatus};
    use crate::infrastructure::in_memory::{ScriptedPoll, ScriptedStatusSource};
    use std::sync::Arc;

    fn confirmed_store(remote_id: Option<&str>) -> SessionStore {
        let store = SessionStore::new();
        store.capture(decode("upi://pay?pa=merchant@upi&am=150").unwrap());
        store
            .confirm(Channel::Ussd, remote_id.map(str::to_string))
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_spawn_requires_remote_id() {
        let store = confirmed_store(None);
        let source = Arc::new(ScriptedStatusSource::always(PaymentStatus::Success));
        assert!(StatusPoller::spawn(store, source, Duration::from_secs(3)).is_none());
    }

    #[tokio::test]
    async fn test_spawn_refuses_terminal_session() {
        let store = confirmed_store(Some("rtx-1"));
        store.update_status(PaymentStatus::Failed).unwrap();
        let source = Arc::new(ScriptedStatusSource::always(PaymentStatus::Success));
        assert!(StatusPoller::spawn(store, source, Duration::from_secs(3)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_until_terminal_then_stops() {
        let store = confirmed_store(Some("rtx-1"));
        let source = Arc::new(ScriptedStatusSource::new([
            ScriptedPoll::Respond(PaymentStatus::Processing),
            ScriptedPoll::Respond(PaymentStatus::Processing),
            ScriptedPoll::Respond(PaymentStatus::Success),
        ]));

        let poller =
            StatusPoller::spawn(store.clone(), source.clone(), Duration::from_secs(3)).unwrap();

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(store.snapshot().status, Some(PaymentStatus::Success));
        assert!(poller.is_finished());
        // Stopped itself after the terminal report: no further fetches.
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_is_skipped_and_retried() {
        let store = confirmed_store(Some("rtx-1"));
        let source = Arc::new(ScriptedStatusSource::new([
            ScriptedPoll::Fail("gateway timeout".to_string()),
            ScriptedPoll::Fail("gateway timeout".to_string()),
            ScriptedPoll::Respond(PaymentStatus::Success),
        ]));

        let poller =
            StatusPoller::spawn(store.clone(), source, Duration::from_secs(3)).unwrap();

        tokio::time::sleep(Duration::from_secs(7)).await;
        // Two failed polls so far: status untouched, loop still alive.
        assert_eq!(store.snapshot().status, Some(PaymentStatus::Confirmed));
        assert!(!poller.is_finished());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.snapshot().status, Some(PaymentStatus::Success));
        assert!(poller.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_stops_polling_before_next_tick() {
        let store = confirmed_store(Some("rtx-1"));
        let source = Arc::new(ScriptedStatusSource::always(PaymentStatus::Processing));

        let poller =
            StatusPoller::spawn(store.clone(), source.clone(), Duration::from_secs(3)).unwrap();

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(source.fetch_count(), 1);

        store.reset();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(poller.is_finished());
        // The generation check fires before the fetch on the next tick.
        assert_eq!(source.fetch_count(), 1);
        assert!(store.snapshot().status.is_none());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let store = confirmed_store(Some("rtx-1"));
        let source = Arc::new(ScriptedStatusSource::always(PaymentStatus::Processing));
        let poller = StatusPoller::spawn(store, source, Duration::from_secs(3)).unwrap();

        poller.stop();
        poller.stop();
        poller.stop();
    }
}
