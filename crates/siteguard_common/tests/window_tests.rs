//! Tests for window.rs

use siteguard_common::window::DayBuckets;
use siteguard_common::DAY_MS;

// Fixed base timestamp, aligned to a day boundary for readable offsets.
fn base() -> i64 {
    1_700_000_000_000_i64 / DAY_MS * DAY_MS
}

#[test]
fn test_single_day_accumulates() {
    let mut counter = DayBuckets::new();
    let now = base();
    counter.add(now, 3);
    counter.add(now + 1000, 2);
    assert_eq!(counter.total(now + 2000), 5);
}

#[test]
fn test_trailing_window_sums_only_recent_days() {
    let mut counter = DayBuckets::new();
    let start = base();

    // One delta per simulated day across two weeks.
    for day in 0..14 {
        counter.add(start + day * DAY_MS, 1);
    }

    // Reading at day 13: buckets for days 6..=13 survive (cutoff = 13 - 7).
    assert_eq!(counter.total(start + 13 * DAY_MS), 8);
}

#[test]
fn test_bucket_expires_past_the_horizon() {
    let mut counter = DayBuckets::new();
    let start = base();
    counter.add(start, 10);

    // Still countable exactly at the horizon.
    assert_eq!(counter.total(start + 7 * DAY_MS), 10);
    // Gone one day later.
    assert_eq!(counter.total(start + 8 * DAY_MS), 0);
}

#[test]
fn test_reads_within_a_day_are_stable() {
    let mut counter = DayBuckets::new();
    let now = base();
    counter.add(now, 4);

    let first = counter.total(now + 60_000);
    let second = counter.total(now + 120_000);
    assert_eq!(first, second);
    assert_eq!(first, 4);
}

#[test]
fn test_pruning_is_idempotent() {
    let mut counter = DayBuckets::new();
    let start = base();
    counter.add(start, 5);
    counter.add(start + 10 * DAY_MS, 7);

    let later = start + 10 * DAY_MS;
    assert_eq!(counter.total(later), 7);
    // Pruning an already-pruned set changes nothing.
    assert_eq!(counter.total(later), 7);
}

#[test]
fn test_add_prunes_expired_buckets() {
    let mut counter = DayBuckets::new();
    let start = base();
    counter.add(start, 5);

    // The add itself discards the stale bucket.
    counter.add(start + 20 * DAY_MS, 1);
    assert_eq!(counter.total(start + 20 * DAY_MS), 1);
}

#[test]
fn test_clear_empties_the_buckets() {
    let mut counter = DayBuckets::new();
    counter.add(base(), 9);
    counter.clear();
    assert!(counter.is_empty());
    assert_eq!(counter.total(base()), 0);
}

#[test]
fn test_serde_round_trip() {
    let mut counter = DayBuckets::new();
    let start = base();
    counter.add(start, 2);
    counter.add(start + DAY_MS, 3);

    let json = serde_json::to_string(&counter).unwrap();
    let mut back: DayBuckets = serde_json::from_str(&json).unwrap();
    assert_eq!(back.total(start + DAY_MS), 5);
}
