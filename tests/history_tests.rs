// HistoryStore tests: windowing, ordering and success rate

mod common;

use common::connectivity_result;
use nocwatch::history::HistoryStore;
use nocwatch::models::RECENT_WINDOW;
use std::time::Duration;

fn store_with_latencies(latencies_ms: &[u64]) -> HistoryStore {
    let mut store = HistoryStore::new();
    for &ms in latencies_ms {
        store.append(connectivity_result(true, true, ms));
    }
    store
}

#[test]
fn empty_store_rate_is_zero() {
    let store = HistoryStore::new();
    assert!(store.is_empty());
    assert_eq!(store.success_rate(), 0.0);
    assert!(store.latest(RECENT_WINDOW).is_empty());
    assert!(store.last().is_none());
}

#[test]
fn latest_returns_fewer_when_history_is_short() {
    let store = store_with_latencies(&[1, 2, 3]);
    let latest = store.latest(10);
    assert_eq!(latest.len(), 3);
    assert_eq!(latest[0].latency(), Duration::from_millis(1));
    assert_eq!(latest[2].latency(), Duration::from_millis(3));
}

#[test]
fn latest_returns_most_recent_in_insertion_order() {
    let latencies: Vec<u64> = (1..=25).collect();
    let store = store_with_latencies(&latencies);
    let latest = store.latest(RECENT_WINDOW);
    assert_eq!(latest.len(), 10);
    let got: Vec<u128> = latest.iter().map(|r| r.latency().as_millis()).collect();
    assert_eq!(got, (16..=25).collect::<Vec<u128>>());
    assert_eq!(store.len(), 25);
    assert_eq!(store.last().unwrap().latency(), Duration::from_millis(25));
}

#[test]
fn latest_zero_is_empty() {
    let store = store_with_latencies(&[1, 2]);
    assert!(store.latest(0).is_empty());
}

#[test]
fn success_rate_counts_whole_history() {
    let mut store = HistoryStore::new();
    store.append(connectivity_result(true, true, 10));
    store.append(connectivity_result(false, true, 10));
    store.append(connectivity_result(true, true, 0));
    store.append(connectivity_result(true, false, 12));
    assert_eq!(store.success_count(), 2);
    assert_eq!(store.success_rate(), 50.0);
}
