//! Tests for history.rs

use siteguard_common::history;
use siteguard_common::store::{HistoryPoint, Site};
use siteguard_common::DAY_MS;

fn site() -> Site {
    Site::new("https://example.com", "example.com", 256)
}

fn point(ts: i64, storage_kb: u64) -> HistoryPoint {
    HistoryPoint {
        ts,
        storage_kb,
        tracker_hits_7d: 0,
        trust: 80,
    }
}

#[test]
fn test_latest_on_empty_history_is_the_default() {
    let s = site();
    let latest = history::latest(&s);
    assert_eq!(latest.trust, 100);
    assert_eq!(latest.storage_kb, 0);
}

#[test]
fn test_append_keeps_order() {
    let mut s = site();
    for day in 0..5 {
        history::append(&mut s, point(day * DAY_MS, day as u64));
    }
    let timestamps: Vec<i64> = s.history.iter().map(|p| p.ts).collect();
    let mut sorted = timestamps.clone();
    sorted.sort();
    assert_eq!(timestamps, sorted);
    assert_eq!(history::latest(&s).storage_kb, 4);
}

#[test]
fn test_prune_drops_points_past_retention() {
    let mut s = site();
    let now = 100 * DAY_MS;

    // Points spanning 40 days against a 30-day retention.
    for day in 0..40 {
        history::append(&mut s, point(now - day * DAY_MS, day as u64));
    }
    s.history.reverse(); // restore chronological order

    history::prune(&mut s, 30, now);

    assert!(s.history.iter().all(|p| p.ts >= now - 30 * DAY_MS));
    assert_eq!(s.history.len(), 31);

    // Survivors keep their original order.
    let timestamps: Vec<i64> = s.history.iter().map(|p| p.ts).collect();
    let mut sorted = timestamps.clone();
    sorted.sort();
    assert_eq!(timestamps, sorted);
}

#[test]
fn test_prune_on_fresh_history_is_a_noop() {
    let mut s = site();
    let now = 50 * DAY_MS;
    history::append(&mut s, point(now - DAY_MS, 10));
    history::append(&mut s, point(now, 12));

    history::prune(&mut s, 30, now);
    assert_eq!(s.history.len(), 2);
}
