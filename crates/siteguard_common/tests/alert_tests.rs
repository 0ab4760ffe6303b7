//! Tests for alert.rs

use siteguard_common::alert::{self, COOLDOWN_MS};
use siteguard_common::store::Site;

const NOW: i64 = 1_700_000_000_000;

fn site_with_storage(kb: u64) -> Site {
    let mut s = Site::new("https://example.com", "example.com", 100);
    s.persistent_bytes = kb * 1024;
    s
}

#[test]
fn test_emits_on_growth_at_threshold() {
    let mut s = site_with_storage(500);
    let alert = alert::evaluate(&mut s, 256, 400, NOW).expect("should emit");
    assert_eq!(alert.delta_kb, 100);
    assert_eq!(alert.threshold_kb, 100);
    assert_eq!(alert.hostname, "example.com");
    assert_eq!(alert.id, format!("sg_example.com_{NOW}"));
    assert_eq!(s.last_alerted_at, NOW);
}

#[test]
fn test_no_emit_below_threshold() {
    let mut s = site_with_storage(500);
    s.threshold_kb = 200;
    assert!(alert::evaluate(&mut s, 256, 400, NOW).is_none());
    assert_eq!(s.last_alerted_at, 0);
}

#[test]
fn test_no_emit_when_storage_shrinks_or_holds() {
    let mut s = site_with_storage(500);
    assert!(alert::evaluate(&mut s, 256, 500, NOW).is_none());
    assert!(alert::evaluate(&mut s, 256, 900, NOW).is_none());
    assert_eq!(s.last_alerted_at, 0);
}

#[test]
fn test_large_absolute_storage_without_growth_stays_silent() {
    let mut s = site_with_storage(1_000_000);
    assert!(alert::evaluate(&mut s, 256, 1_000_000, NOW).is_none());
}

#[test]
fn test_cooldown_suppresses_within_an_hour() {
    let mut s = site_with_storage(500);
    assert!(alert::evaluate(&mut s, 256, 100, NOW).is_some());

    // Keeps growing, but every cycle inside the hour is suppressed.
    s.persistent_bytes = 2000 * 1024;
    for minutes in [1, 10, 30, 59] {
        let later = NOW + minutes * 60_000;
        assert!(
            alert::evaluate(&mut s, 256, 100, later).is_none(),
            "emitted again after {minutes} minutes"
        );
    }

    // One hour later it may fire again.
    let after = NOW + COOLDOWN_MS;
    assert!(alert::evaluate(&mut s, 256, 100, after).is_some());
    assert_eq!(s.last_alerted_at, after);
}

#[test]
fn test_threshold_falls_back_to_default_when_unset() {
    let mut s = site_with_storage(300);
    s.threshold_kb = 0;
    let alert = alert::evaluate(&mut s, 256, 0, NOW).expect("should emit");
    assert_eq!(alert.threshold_kb, 256);
}

#[test]
fn test_first_observation_yields_zero_delta() {
    // Callers pass the current figure when no history exists.
    let mut s = site_with_storage(700);
    let current = s.storage_kb();
    assert!(alert::evaluate(&mut s, 256, current, NOW).is_none());
}

#[test]
fn test_suppression_does_not_touch_cooldown() {
    let mut s = site_with_storage(500);
    assert!(alert::evaluate(&mut s, 256, 450, NOW).is_none());
    assert_eq!(s.last_alerted_at, 0, "suppression must not advance the cooldown");
}
