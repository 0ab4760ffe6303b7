//! Bounded per-site history series.
//!
//! One point is appended per snapshot cycle, never per raw event; pruning
//! keeps the series inside the configured retention window.

use crate::store::{HistoryPoint, Site};
use crate::DAY_MS;

/// Point reported for an empty series. Callers must never treat an empty
/// history as an error.
pub const EMPTY_DEFAULT: HistoryPoint = HistoryPoint {
    ts: 0,
    storage_kb: 0,
    tracker_hits_7d: 0,
    trust: 100,
};

/// Drop points older than the retention window. Ordering is preserved.
pub fn prune(site: &mut Site, retention_days: u32, now_ms: i64) {
    let cutoff = now_ms - i64::from(retention_days) * DAY_MS;
    site.history.retain(|p| p.ts >= cutoff);
}

/// Append one point. Callers append in chronological order (one point per
/// snapshot cycle), so no re-sort is needed.
pub fn append(site: &mut Site, point: HistoryPoint) {
    site.history.push(point);
}

/// The most recent point, or [`EMPTY_DEFAULT`] for an empty series.
pub fn latest(site: &Site) -> HistoryPoint {
    site.history.last().copied().unwrap_or(EMPTY_DEFAULT)
}
