//! Tests for trust.rs

use siteguard_common::store::Site;
use siteguard_common::trust;

fn site() -> Site {
    Site::new("https://example.com", "example.com", 256)
}

#[test]
fn test_quiet_site_scores_100() {
    assert_eq!(trust::score(&site()), 100);
}

#[test]
fn test_worked_example_scores_25() {
    // 100 tracker hits cap at 45, 10 third-party cookies cap at 25:
    // 100 - 45 - 25 = 30, compressed below the risky line to 25.
    let mut s = site();
    s.tracker_hits_7d = 100;
    s.third_party_cookies = 10;
    assert_eq!(trust::score(&s), 25);
}

#[test]
fn test_no_compression_at_exactly_40() {
    // Penalties sum to 60: trackers 30, third-party 25, service worker 5.
    let mut s = site();
    s.tracker_hits_7d = 15;
    s.third_party_cookies = 5;
    s.service_worker_present = true;
    assert_eq!(trust::score(&s), 40);
}

#[test]
fn test_compression_just_below_40() {
    // Penalties sum to 61, score 39, compressed to floor(39 * 0.85) = 33.
    let mut s = site();
    s.tracker_hits_7d = 18;
    s.third_party_cookies = 4;
    s.service_worker_present = true;
    assert_eq!(trust::score(&s), 33);
}

#[test]
fn test_extreme_signals_bottom_out_at_zero() {
    let mut s = site();
    s.tracker_hits_7d = u64::MAX / 4;
    s.third_party_cookies = u32::MAX;
    s.persistent_bytes = u64::MAX / 4;
    s.storage_events_7d = u64::MAX / 4;
    s.service_worker_present = true;
    assert_eq!(trust::score(&s), 0);
}

#[test]
fn test_storage_penalty_uses_persistent_bytes_only() {
    let mut s = site();
    s.session_bytes = 100 * 1024 * 1024;
    assert_eq!(trust::score(&s), 100);

    // 64 KB of persistent storage is exactly one point.
    s.persistent_bytes = 64 * 1024;
    assert_eq!(trust::score(&s), 99);
}

#[test]
fn test_churn_penalty_steps_per_50_events() {
    let mut s = site();
    s.storage_events_7d = 49;
    assert_eq!(trust::score(&s), 100);
    s.storage_events_7d = 50;
    assert_eq!(trust::score(&s), 99);
    s.storage_events_7d = 10_000;
    // Capped at 10 points.
    assert_eq!(trust::score(&s), 90);
}

#[test]
fn test_monotone_in_every_signal() {
    let trackers = [0u64, 1, 5, 22, 23, 100];
    let cookies = [0u32, 1, 4, 5, 10];
    let storage = [0u64, 64 * 1024, 640 * 1024, 10 * 1024 * 1024];
    let events = [0u64, 49, 50, 500, 1000];

    let score_for = |t: u64, c: u32, p: u64, e: u64, sw: bool| {
        let mut s = site();
        s.tracker_hits_7d = t;
        s.third_party_cookies = c;
        s.persistent_bytes = p;
        s.storage_events_7d = e;
        s.service_worker_present = sw;
        trust::score(&s)
    };

    for &c in &cookies {
        for &p in &storage {
            for &e in &events {
                for sw in [false, true] {
                    let mut prev = u8::MAX;
                    for &t in &trackers {
                        let got = score_for(t, c, p, e, sw);
                        assert!(got <= prev, "score rose with more tracker hits");
                        prev = got;
                    }
                }
            }
        }
    }

    for &t in &trackers {
        let mut prev = u8::MAX;
        for &c in &cookies {
            let got = score_for(t, c, 0, 0, false);
            assert!(got <= prev, "score rose with more third-party cookies");
            prev = got;
        }
        assert!(score_for(t, 0, 0, 0, true) <= score_for(t, 0, 0, 0, false));
    }
}

#[test]
fn test_deterministic() {
    let mut s = site();
    s.tracker_hits_7d = 7;
    s.third_party_cookies = 2;
    s.persistent_bytes = 300 * 1024;
    let first = trust::score(&s);
    for _ in 0..10 {
        assert_eq!(trust::score(&s), first);
    }
}
