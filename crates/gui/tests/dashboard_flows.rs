use std::sync::Arc;
use std::time::{Duration, Instant};

use qdeck_api::{AutoConfirm, MockBackend, QueueProvider, QueueService};
use qdeck_gui::dashboard::{ActionKind, ActionOutcome, Dashboard, LoadOrigin, LoadOutcome};
use qdeck_gui::render::{CardAction, CardArea, EmptyState};

const ORDERS: &str = "http://localhost:4566/000000000000/orders";
const BILLING: &str = "http://localhost:4566/000000000000/billing";
const EMPTY: &str = "http://localhost:4566/000000000000/idle";

fn backend() -> Arc<MockBackend> {
    Arc::new(MockBackend::new().with_queue(ORDERS, 3, 1, 0).with_queue(BILLING, 5, 0, 0).with_queue(EMPTY, 0, 0, 0))
}

async fn load(d: &mut Dashboard, p: &dyn QueueProvider, origin: LoadOrigin) -> Option<LoadOutcome> {
    let ticket = d.begin_load(origin)?;
    let result = p.list_queues().await;
    Some(d.finish_load(ticket, result, Instant::now()))
}

#[tokio::test]
async fn poll_patches_only_what_changed() {
    let be = backend();
    let svc = QueueService::new(be.clone(), Arc::new(AutoConfirm::yes()));
    let mut d = Dashboard::new(Duration::from_millis(800));
    assert_eq!(load(&mut d, &svc, LoadOrigin::Manual).await, Some(LoadOutcome::Applied));
    assert_eq!(d.cards().len(), 3);
    let billing_id = d.cards().get(BILLING).map(|c| c.id);
    let orders_id = d.cards().get(ORDERS).map(|c| c.id);

    be.set_attribute(ORDERS, "ApproximateNumberOfMessages", "10");
    load(&mut d, &svc, LoadOrigin::Timer).await;
    assert_eq!(d.cards().get(ORDERS).map(|c| c.view.visible), Some(10));
    assert_eq!(d.cards().get(ORDERS).map(|c| c.id), orders_id);
    assert_eq!(d.cards().get(BILLING).map(|c| c.id), billing_id);
    assert_eq!(d.last_render().created, 0);
    assert_eq!(d.stats().messages, 15);
}

#[tokio::test]
async fn search_and_hide_empty_drive_the_cards() {
    let svc = QueueService::new(backend(), Arc::new(AutoConfirm::yes()));
    let mut d = Dashboard::new(Duration::from_millis(800));
    load(&mut d, &svc, LoadOrigin::Manual).await;

    d.set_hide_empty(true);
    assert!(d.cards().get(EMPTY).is_none());
    assert_eq!(d.stats().queue_display(), "2/3");

    d.set_search("ORD");
    let names: Vec<_> = d.cards().iter().map(|c| c.view.name.clone()).collect();
    assert_eq!(names, vec!["orders"]);

    d.set_search("zzz");
    assert_eq!(d.cards().area(), CardArea::Empty(EmptyState::NoMatches));
}

#[tokio::test]
async fn declined_purge_never_opens_the_modal() {
    let be = backend();
    let svc = QueueService::new(be.clone(), Arc::new(AutoConfirm::no()));
    let mut d = Dashboard::new(Duration::from_millis(800));
    load(&mut d, &svc, LoadOrigin::Manual).await;

    let intents = d.cards().click(ORDERS, CardAction::Purge);
    assert_eq!(intents.len(), 1);
    let result = svc.purge_queue(&intents[0].queue_url).await;
    assert_eq!(d.action_finished(ActionKind::Purge, &result), ActionOutcome::Cancelled);
    let result = svc.delete_queue(ORDERS).await;
    assert_eq!(d.action_finished(ActionKind::Delete, &result), ActionOutcome::Cancelled);
    assert!(d.error().is_none());
    assert!(be.purged().is_empty());
}

#[tokio::test]
async fn delete_then_reload_drops_the_card() {
    let be = backend();
    let svc = QueueService::new(be.clone(), Arc::new(AutoConfirm::yes()));
    let mut d = Dashboard::new(Duration::from_millis(800));
    load(&mut d, &svc, LoadOrigin::Manual).await;
    let billing_id = d.cards().get(BILLING).map(|c| c.id);

    let result = svc.delete_queue(ORDERS).await;
    match d.action_finished(ActionKind::Delete, &result) {
        ActionOutcome::Succeeded { toast, .. } => assert_eq!(toast, "Queue deleted successfully"),
        other => panic!("unexpected {:?}", other),
    }
    load(&mut d, &svc, LoadOrigin::Manual).await;
    assert!(d.cards().get(ORDERS).is_none());
    assert_eq!(d.last_render().removed, 1);
    assert_eq!(d.cards().get(BILLING).map(|c| c.id), billing_id);
}

#[tokio::test]
async fn failed_poll_keeps_polling_and_shows_one_modal() {
    let be = backend();
    let svc = QueueService::new(be.clone(), Arc::new(AutoConfirm::yes()));
    let mut d = Dashboard::new(Duration::from_millis(800));
    load(&mut d, &svc, LoadOrigin::Manual).await;

    be.fail_list(Some("dispatch failure: Connection refused"));
    assert_eq!(load(&mut d, &svc, LoadOrigin::Timer).await, Some(LoadOutcome::Failed));
    assert_eq!(d.error().map(|e| e.title.as_str()), Some("Failed to load queues"));
    assert_eq!(d.cards().len(), 3, "last good data stays on screen");

    be.fail_list(None);
    assert_eq!(load(&mut d, &svc, LoadOrigin::Timer).await, Some(LoadOutcome::Applied));
    assert!(d.auto_refresh());
}

#[tokio::test]
async fn purge_all_partial_failure_reports_both() {
    let be = backend();
    be.fail_purge(BILLING);
    let svc = QueueService::new(be.clone(), Arc::new(AutoConfirm::yes()));
    let mut d = Dashboard::new(Duration::from_millis(800));
    let result = svc.purge_all_queues().await;
    match d.action_finished(ActionKind::PurgeAll, &result) {
        ActionOutcome::Succeeded { toast, .. } => {
            assert!(toast.starts_with("Purged 2 of 3 queues"));
            assert!(toast.contains("billing: "));
        }
        other => panic!("unexpected {:?}", other),
    }
}
