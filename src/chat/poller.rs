//! Background polling of a case's public status
//!
//! A [`CaseWatch`] is a cancellable subscription bound to one case id. It
//! owns a tokio task that wakes on a fixed cadence, fetches the public
//! status without holding the synchronizer lock, then locks and applies
//! the response through [`Synchronizer::apply_poll_update`].
//!
//! The task ends when:
//!
//! - the case reaches a terminal state (closed or final reply delivered)
//! - the synchronizer no longer tracks this case (reset, new case)
//! - the watch is cancelled or dropped
//!
//! Because the lock is released across the network call, two overlapping
//! responses may both carry the same final reply. The message log's
//! idempotent append makes that harmless.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::BackendApi;
use crate::chat::synchronizer::{PollOutcome, Synchronizer};

/// Default polling cadence
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Handle to a running poll task
///
/// Dropping the handle cancels the task.
pub struct CaseWatch {
    case_id: String,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
    updates: watch::Receiver<Option<PollOutcome>>,
}

impl CaseWatch {
    /// Start polling `case_id` every `interval`
    ///
    /// The first poll happens one interval after spawning.
    pub fn spawn(
        sync: Arc<Mutex<Synchronizer>>,
        api: Arc<dyn BackendApi>,
        case_id: impl Into<String>,
        interval: Duration,
    ) -> Self {
        let case_id = case_id.into();
        let token = CancellationToken::new();
        let (tx, updates) = watch::channel(None);

        tracing::debug!("Watching case {} every {:?}", case_id, interval);
        let handle = tokio::spawn(poll_loop(
            sync,
            api,
            case_id.clone(),
            interval,
            token.clone(),
            tx,
        ));

        Self {
            case_id,
            token,
            handle: Some(handle),
            updates,
        }
    }

    /// Case this watch polls
    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    /// Stop polling; no further updates are applied after this returns
    /// and the current tick finishes
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// `true` once the poll task has ended
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Receiver notified after every applied poll response
    pub fn updates(&self) -> watch::Receiver<Option<PollOutcome>> {
        self.updates.clone()
    }

    /// Wait for the poll task to end
    pub async fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!("Case watch for {} ended abnormally: {}", self.case_id, e);
            }
        }
    }
}

impl Drop for CaseWatch {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn poll_loop(
    sync: Arc<Mutex<Synchronizer>>,
    api: Arc<dyn BackendApi>,
    case_id: String,
    period: Duration,
    token: CancellationToken,
    updates: watch::Sender<Option<PollOutcome>>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => {
                tracing::debug!("Case watch for {} cancelled", case_id);
                break;
            }

            _ = ticker.tick() => {}
        }

        if sync.lock().await.case_id() != Some(case_id.as_str()) {
            tracing::debug!("Case {} is no longer active, stopping watch", case_id);
            break;
        }

        tracing::debug!("Polling status of case {}", case_id);
        let fetched = tokio::select! {
            biased;

            _ = token.cancelled() => break,

            fetched = api.case_public_status(&case_id) => fetched,
        };

        let update = match fetched {
            Ok(update) => update,
            Err(e) => {
                tracing::warn!("Status poll for case {} failed: {}", case_id, e);
                continue;
            }
        };

        if token.is_cancelled() {
            break;
        }

        let outcome = sync.lock().await.apply_poll_update(&case_id, &update);
        updates.send_replace(Some(outcome));
        if outcome.stops_polling() {
            tracing::debug!("Case watch for {} finished: {:?}", case_id, outcome);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::api::ChatResponse;
    use crate::chat::status::CaseStatus;
    use crate::storage::MemorySessionStore;
    use crate::test_utils::public_status;

    const TICK: Duration = Duration::from_millis(10);

    async fn shared_with_case(fake: &Arc<FakeBackend>) -> Arc<Mutex<Synchronizer>> {
        fake.push_chat_response(ChatResponse {
            session_id: String::new(),
            assistant_message: "Case opened.".to_string(),
            case_id: Some("c1".to_string()),
            status: Some(CaseStatus::ReadyForHumanReview),
        });
        let mut sync = Synchronizer::new(fake.clone(), Arc::new(MemorySessionStore::new()));
        sync.initialize().await;
        sync.send_user_message("broken", None, false).await;
        Arc::new(Mutex::new(sync))
    }

    #[tokio::test]
    async fn test_watch_stops_on_final_reply() {
        let fake = Arc::new(FakeBackend::new());
        let sync = shared_with_case(&fake).await;
        fake.push_public_status(
            "c1",
            public_status("c1", Some(CaseStatus::ReadyForHumanReview), None),
        );
        fake.push_public_status(
            "c1",
            public_status("c1", Some(CaseStatus::Closed), Some("Refunded.")),
        );

        let watch = CaseWatch::spawn(sync.clone(), fake.clone(), "c1", TICK);
        tokio::time::timeout(Duration::from_secs(5), watch.join())
            .await
            .unwrap();

        let sync = sync.lock().await;
        assert_eq!(sync.case_id(), None);
        assert_eq!(sync.messages().messages().last().unwrap().content, "Refunded.");
        assert_eq!(fake.poll_calls(), 2);
    }

    #[tokio::test]
    async fn test_watch_survives_poll_errors() {
        let fake = Arc::new(FakeBackend::new());
        let sync = shared_with_case(&fake).await;
        fake.fail_next_public_status("c1");
        fake.push_public_status("c1", public_status("c1", Some(CaseStatus::Closed), None));

        let watch = CaseWatch::spawn(sync.clone(), fake.clone(), "c1", TICK);
        tokio::time::timeout(Duration::from_secs(5), watch.join())
            .await
            .unwrap();

        assert!(fake.poll_calls() >= 2);
        assert_eq!(sync.lock().await.case_id(), None);
    }

    #[tokio::test]
    async fn test_cancel_stops_polling() {
        let fake = Arc::new(FakeBackend::new());
        let sync = shared_with_case(&fake).await;
        fake.push_public_status(
            "c1",
            public_status("c1", Some(CaseStatus::ReadyForHumanReview), None),
        );

        let watch = CaseWatch::spawn(sync.clone(), fake.clone(), "c1", TICK);
        tokio::time::sleep(TICK * 5).await;
        watch.cancel();
        tokio::time::sleep(TICK * 3).await;
        assert!(watch.is_finished());

        let polls = fake.poll_calls();
        tokio::time::sleep(TICK * 5).await;
        assert_eq!(fake.poll_calls(), polls);
        assert_eq!(sync.lock().await.case_id(), Some("c1"));
    }

    #[tokio::test]
    async fn test_watch_ends_when_case_changes() {
        let fake = Arc::new(FakeBackend::new());
        let sync = shared_with_case(&fake).await;
        let watch = CaseWatch::spawn(sync.clone(), fake.clone(), "other", TICK);
        tokio::time::timeout(Duration::from_secs(5), watch.join())
            .await
            .unwrap();
        assert_eq!(fake.poll_calls(), 0);
    }

    #[tokio::test]
    async fn test_updates_channel_reports_outcome() {
        let fake = Arc::new(FakeBackend::new());
        let sync = shared_with_case(&fake).await;
        fake.push_public_status("c1", public_status("c1", Some(CaseStatus::Approved), None));

        let watch = CaseWatch::spawn(sync, fake.clone(), "c1", TICK);
        let mut updates = watch.updates();
        tokio::time::timeout(Duration::from_secs(5), updates.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            *updates.borrow(),
            Some(PollOutcome::Updated(Some(CaseStatus::Approved)))
        );
        drop(watch);
    }
}
