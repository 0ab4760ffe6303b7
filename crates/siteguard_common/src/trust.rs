//! Heuristic trust scoring.
//!
//! Weights are policy: tunable, but the ordering intent is fixed. More
//! signals always means a lower score. Each penalty term is capped before
//! summation so one runaway signal cannot drive the total negative and
//! distort the shape of the curve for every other site.

use crate::store::Site;

/// Points per tracker hit over the trailing week. Trackers are the biggest
/// hit.
const TRACKER_WEIGHT: u64 = 2;
const TRACKER_CAP: u64 = 45;

/// Points per third-party cookie.
const THIRD_PARTY_WEIGHT: u64 = 5;
const THIRD_PARTY_CAP: u64 = 25;

/// One point per this many KB of persistent storage.
const KB_PER_POINT: u64 = 64;
const STORAGE_CAP: u64 = 20;

/// One point per this many storage churn events over the trailing week.
const EVENTS_PER_POINT: u64 = 50;
const CHURN_CAP: u64 = 10;

/// Flat penalty when a service worker is registered. Not always bad, but
/// still a persistence signal.
const SERVICE_WORKER_PENALTY: u64 = 5;

/// Scores below this line are compressed to widen the visual gap between
/// "bad" and "very bad" on the dashboard.
const RISKY_LINE: i64 = 40;

/// Map a site's current signals to a 0-100 trust score (lower = riskier).
///
/// Deterministic and side-effect free; only the aggregated fields on the
/// record are consulted.
pub fn score(site: &Site) -> u8 {
    let tracker_penalty = site.tracker_hits_7d.saturating_mul(TRACKER_WEIGHT).min(TRACKER_CAP);

    let third_party_penalty = u64::from(site.third_party_cookies)
        .saturating_mul(THIRD_PARTY_WEIGHT)
        .min(THIRD_PARTY_CAP);

    let persistent_kb = site.persistent_bytes / 1024;
    let storage_penalty = (persistent_kb / KB_PER_POINT).min(STORAGE_CAP);

    let churn_penalty = (site.storage_events_7d / EVENTS_PER_POINT).min(CHURN_CAP);

    let sw_penalty = if site.service_worker_present {
        SERVICE_WORKER_PENALTY
    } else {
        0
    };

    let total =
        (tracker_penalty + third_party_penalty + storage_penalty + churn_penalty + sw_penalty) as i64;

    let mut score = (100 - total).clamp(0, 100);
    if score < RISKY_LINE {
        score = score * 85 / 100;
    }
    score as u8
}
