//! CaseWatch integration tests
//!
//! Runs real poll tasks on short intervals against the fake backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{chat_reply, public_status, started_synchronizer};
use ecomdesk::chat::{CaseStatus, CaseWatch, PollOutcome};
use tokio::sync::Mutex;

const TICK: Duration = Duration::from_millis(10);

#[tokio::test]
async fn test_watch_delivers_final_reply_once_and_stops() {
    let (mut sync, fake, _store) = started_synchronizer().await;
    fake.push_chat_response(chat_reply(
        "Opened.",
        Some("c1"),
        Some(CaseStatus::ReadyForHumanReview),
    ));
    sync.send_user_message("broken", None, false).await;
    let before = sync.messages().len();

    for _ in 0..3 {
        fake.push_public_status(
            "c1",
            public_status("c1", Some(CaseStatus::ReadyForHumanReview), None),
        );
    }
    fake.push_public_status(
        "c1",
        public_status(
            "c1",
            Some(CaseStatus::Closed),
            Some("Your refund has been processed."),
        ),
    );

    let sync = Arc::new(Mutex::new(sync));
    let watch = CaseWatch::spawn(sync.clone(), fake.clone(), "c1", TICK);
    tokio::time::timeout(Duration::from_secs(5), watch.join())
        .await
        .expect("watch finished");

    let sync = sync.lock().await;
    assert_eq!(sync.messages().len(), before + 1);
    assert_eq!(sync.case_id(), None);
    assert_eq!(fake.poll_calls(), 4);
}

#[tokio::test]
async fn test_dropping_watch_cancels_polling() {
    let (mut sync, fake, _store) = started_synchronizer().await;
    sync.apply_case_update(Some("c1"), Some(CaseStatus::ReadyForHumanReview));
    fake.push_public_status(
        "c1",
        public_status("c1", Some(CaseStatus::ReadyForHumanReview), None),
    );

    let sync = Arc::new(Mutex::new(sync));
    let watch = CaseWatch::spawn(sync.clone(), fake.clone(), "c1", TICK);
    let mut updates = watch.updates();
    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .expect("first poll applied")
        .expect("watch still running");
    drop(watch);

    tokio::time::sleep(TICK * 3).await;
    let polls = fake.poll_calls();
    tokio::time::sleep(TICK * 10).await;
    assert_eq!(fake.poll_calls(), polls);
    assert_eq!(sync.lock().await.case_id(), Some("c1"));
}

#[tokio::test]
async fn test_reset_stops_watch_for_old_case() {
    let (mut sync, fake, _store) = started_synchronizer().await;
    sync.apply_case_update(Some("c1"), Some(CaseStatus::ReadyForHumanReview));
    fake.push_public_status(
        "c1",
        public_status("c1", Some(CaseStatus::ReadyForHumanReview), None),
    );

    let sync = Arc::new(Mutex::new(sync));
    let watch = CaseWatch::spawn(sync.clone(), fake.clone(), "c1", TICK);
    let mut updates = watch.updates();
    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .expect("first poll applied")
        .expect("watch still running");
    assert_eq!(
        *updates.borrow(),
        Some(PollOutcome::Updated(Some(CaseStatus::ReadyForHumanReview)))
    );

    sync.lock().await.reset_session().await;
    tokio::time::timeout(Duration::from_secs(5), watch.join())
        .await
        .expect("watch ended after reset");
    assert_eq!(sync.lock().await.case_id(), None);
}
