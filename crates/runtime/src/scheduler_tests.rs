use std::time::Duration;

use devlog_adapters::test_support::{FailingPoller, FakePoller};
use devlog_storage::StorageEngine;

use super::*;

#[tokio::test]
async fn spawned_poller_polls_immediately_and_on_an_interval() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let scheduler = PollerScheduler::new(storage.clone());
    let poller = Arc::new(FakePoller::new(Duration::from_millis(20)));
    let parent = CancellationToken::new();

    let handle = scheduler.spawn(poller.clone(), &parent);
    tokio::time::sleep(Duration::from_millis(90)).await;
    handle.stop().await;

    assert!(poller.call_count() >= 2);
    assert!(storage.count().unwrap() >= 2);
}

/// A poller with a 50ms cadence that emits one event per call should have
/// produced at least 8 events within a 500ms window.
#[tokio::test]
async fn fast_poller_reaches_cadence_floor_within_the_window() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let scheduler = PollerScheduler::new(storage.clone());
    let poller = Arc::new(FakePoller::new(Duration::from_millis(50)));
    let parent = CancellationToken::new();

    let handle = scheduler.spawn(poller, &parent);
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.stop().await;

    assert!(storage.count().unwrap() >= 8);
}

#[tokio::test]
async fn stop_cancels_the_poller_promptly() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let scheduler = PollerScheduler::new(storage);
    let poller = Arc::new(FakePoller::new(Duration::from_secs(60)));
    let parent = CancellationToken::new();

    let handle = scheduler.spawn(poller, &parent);
    tokio::time::timeout(Duration::from_millis(500), handle.stop())
        .await
        .expect("stop should return promptly rather than waiting out the poll interval");
}

#[tokio::test]
async fn parent_cancellation_stops_every_child_poller() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let scheduler = PollerScheduler::new(storage);
    let poller = Arc::new(FakePoller::new(Duration::from_secs(60)));
    let parent = CancellationToken::new();

    let handle = scheduler.spawn(poller, &parent);
    parent.cancel();
    tokio::time::timeout(Duration::from_millis(500), handle.join)
        .await
        .expect("poller task should exit once the parent token is cancelled")
        .unwrap();
}

#[tokio::test]
async fn a_failing_poller_does_not_insert_events_and_keeps_retrying() {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let scheduler = PollerScheduler::new(storage.clone());
    let poller = Arc::new(FailingPoller::new(Duration::from_millis(20)));
    let parent = CancellationToken::new();

    let handle = scheduler.spawn(poller, &parent);
    tokio::time::sleep(Duration::from_millis(90)).await;
    handle.stop().await;

    assert_eq!(storage.count().unwrap(), 0);
}
