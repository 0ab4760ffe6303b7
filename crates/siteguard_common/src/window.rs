//! Day-bucketed rolling counters.
//!
//! Approximates a sliding 7-day window with daily granularity: deltas land
//! in the bucket for the current epoch day, and any write or read discards
//! buckets past the horizon. Reporting granularity is daily, so the coarse
//! window is acceptable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::day_index;

/// Number of trailing days a bucket stays countable.
pub const WINDOW_DAYS: i64 = 7;

/// Rolling per-day delta buckets backing a 7-day counter.
///
/// Serialized as a plain day-index -> count map inside the site record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayBuckets {
    buckets: BTreeMap<i64, u64>,
}

impl DayBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `delta` against the current day's bucket.
    pub fn add(&mut self, now_ms: i64, delta: u64) {
        let today = day_index(now_ms);
        self.prune(today);
        *self.buckets.entry(today).or_insert(0) += delta;
    }

    /// Sum of all buckets within the trailing window.
    ///
    /// Prunes expired buckets as a side effect, so stored summary fields can
    /// be refreshed by re-reading even when nothing was added.
    pub fn total(&mut self, now_ms: i64) -> u64 {
        self.prune(day_index(now_ms));
        self.buckets.values().sum()
    }

    /// Discard buckets older than the window. Idempotent: pruning an
    /// already-pruned set is a no-op.
    fn prune(&mut self, today: i64) {
        let cutoff = today - WINDOW_DAYS;
        self.buckets.retain(|day, _| *day >= cutoff);
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
