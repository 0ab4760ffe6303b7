//! The persisted store document.
//!
//! One JSON value holding settings, exclusions, snapshot metadata and every
//! tracked site, read and written wholesale by the daemon. Everything here
//! is plain data plus the record-keeping helpers the engine needs; no I/O.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::day_index;
use crate::window::DayBuckets;

/// File name of the current schema version. Older schema versions live
/// under their own names; there is no live migration.
pub const STORE_FILE: &str = "store_v1.json";

/// Engine settings. Mutated only by explicit user settings actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub snapshot_interval_minutes: u64,
    pub default_threshold_kb: u64,
    pub history_retention_days: u32,
    pub daily_report_enabled: bool,
    pub daily_report_hour_local: u8,
    pub daily_report_top_n: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snapshot_interval_minutes: 30,
            default_threshold_kb: 256,
            history_retention_days: 30,
            daily_report_enabled: false,
            daily_report_hour_local: 9,
            daily_report_top_n: 5,
        }
    }
}

/// Hostnames fully opted out: no ingestion, no history, no alerts, and no
/// contribution to aggregates. Existing data is frozen, not deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exclusions {
    pub hostnames: BTreeSet<String>,
}

/// Bookkeeping for incremental tracker-match pulls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    /// Epoch ms of the last successful snapshot, 0 = never.
    pub last_snapshot_at: i64,
    /// Reason code of the last run ("scheduled" / "on_demand").
    pub last_snapshot_reason: String,
}

/// The whole aggregation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Store {
    pub settings: Settings,
    pub exclusions: Exclusions,
    pub meta: Meta,
    pub sites: BTreeMap<String, Site>,
}

impl Store {
    /// Fetch the record for `origin`, creating it lazily with the configured
    /// default threshold. `hostname` must already be parsed from the origin.
    pub fn site_mut(&mut self, origin: &str, hostname: &str) -> &mut Site {
        let default_threshold = self.settings.default_threshold_kb;
        self.sites
            .entry(origin.to_string())
            .or_insert_with(|| Site::new(origin, hostname, default_threshold))
    }

    pub fn is_excluded(&self, hostname: &str) -> bool {
        self.exclusions.hostnames.contains(hostname)
    }
}

/// Per-origin aggregation record.
///
/// Created lazily on the first signal and kept for the lifetime of the
/// store; [`Site::clear`] resets the accumulated data without giving up the
/// record's identity or threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Site {
    pub origin: String,
    pub hostname: String,

    /// Last signal of any kind, epoch ms.
    pub last_seen: i64,
    /// First signal of the current day; consumers compare day indexes to
    /// decide whether the site was seen "today".
    pub last_seen_today: i64,

    // Cookies
    pub cookies_count: u32,
    pub cookies_bytes_estimate: u64,
    pub third_party_cookies: u32,

    // Storage estimates (proxy figures by design)
    pub persistent_bytes: u64,
    pub session_bytes: u64,

    pub service_worker_present: bool,

    // Rolling 7-day summaries, kept equal to their bucket sums
    pub tracker_hits_7d: u64,
    pub storage_events_7d: u64,

    // Alerting
    pub threshold_kb: u64,
    pub last_alerted_at: i64,

    pub history: Vec<HistoryPoint>,

    pub tracker_buckets: DayBuckets,
    pub storage_event_buckets: DayBuckets,
}

impl Default for Site {
    fn default() -> Self {
        Site::new("", "", 0)
    }
}

impl Site {
    pub fn new(origin: &str, hostname: &str, threshold_kb: u64) -> Self {
        Self {
            origin: origin.to_string(),
            hostname: hostname.to_string(),
            last_seen: 0,
            last_seen_today: 0,
            cookies_count: 0,
            cookies_bytes_estimate: 0,
            third_party_cookies: 0,
            persistent_bytes: 0,
            session_bytes: 0,
            service_worker_present: false,
            tracker_hits_7d: 0,
            storage_events_7d: 0,
            threshold_kb,
            last_alerted_at: 0,
            history: Vec::new(),
            tracker_buckets: DayBuckets::new(),
            storage_event_buckets: DayBuckets::new(),
        }
    }

    /// Mark a signal at `now_ms`. `last_seen_today` keeps the first signal
    /// of the current day so the daily digest can tell today's sites apart.
    pub fn mark_seen(&mut self, now_ms: i64) {
        if day_index(self.last_seen_today) != day_index(now_ms) {
            self.last_seen_today = now_ms;
        }
        self.last_seen = now_ms;
    }

    /// Whether the site was seen on the same day as `now_ms`.
    pub fn seen_on_day(&self, now_ms: i64) -> bool {
        self.last_seen_today != 0 && day_index(self.last_seen_today) == day_index(now_ms)
    }

    /// Record tracker matches attributed to this origin.
    pub fn add_tracker_hits(&mut self, now_ms: i64, count: u64) {
        self.tracker_buckets.add(now_ms, count);
        self.tracker_hits_7d = self.tracker_buckets.total(now_ms);
    }

    /// Record storage churn events reported by the page collector.
    pub fn add_storage_events(&mut self, now_ms: i64, count: u64) {
        self.storage_event_buckets.add(now_ms, count);
        self.storage_events_7d = self.storage_event_buckets.total(now_ms);
    }

    /// Refresh both 7-day summaries against `now_ms` without adding, so the
    /// window keeps decaying on sites with no new signals.
    pub fn refresh_counters(&mut self, now_ms: i64) {
        self.tracker_hits_7d = self.tracker_buckets.total(now_ms);
        self.storage_events_7d = self.storage_event_buckets.total(now_ms);
    }

    /// Combined storage estimate in KB, the figure history and alerts use.
    pub fn storage_kb(&self) -> u64 {
        (self.persistent_bytes + self.session_bytes) / 1024
    }

    /// Reset all accumulated data. Origin identity, threshold and the alert
    /// cooldown survive; the record itself is never deleted here.
    pub fn clear(&mut self) {
        self.cookies_count = 0;
        self.cookies_bytes_estimate = 0;
        self.third_party_cookies = 0;
        self.persistent_bytes = 0;
        self.session_bytes = 0;
        self.service_worker_present = false;
        self.tracker_hits_7d = 0;
        self.storage_events_7d = 0;
        self.tracker_buckets.clear();
        self.storage_event_buckets.clear();
        self.history.clear();
    }
}

/// One snapshot-cycle observation. Immutable once appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub ts: i64,
    pub storage_kb: u64,
    /// Snapshot value of the rolling tracker counter at `ts`.
    pub tracker_hits_7d: u64,
    pub trust: u8,
}
