//! Daily digest built from the day's observations.

use serde::{Deserialize, Serialize};

use crate::store::Store;
use crate::trust;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestEntry {
    pub origin: String,
    pub hostname: String,
    pub trust: u8,
    pub storage_kb: u64,
    pub tracker_hits_7d: u64,
}

/// The day's digest: lowest-trust origin first, then the rest of the
/// ascending-trust leaderboard capped at the configured top-N.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyDigest {
    pub ts: i64,
    pub entries: Vec<DigestEntry>,
}

impl DailyDigest {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The riskiest site of the day, if any site was seen at all.
    pub fn lowest(&self) -> Option<&DigestEntry> {
        self.entries.first()
    }

    pub fn title(&self) -> String {
        "siteguard daily report".to_string()
    }

    /// Human-readable notification body.
    pub fn message(&self) -> String {
        let Some(lowest) = self.lowest() else {
            return "No sites observed today.".to_string();
        };
        let mut lines = vec![format!(
            "Lowest trust today: {} ({})",
            lowest.hostname, lowest.trust
        )];
        for (i, entry) in self.entries.iter().enumerate() {
            lines.push(format!(
                "{}. {} (trust {}, {} KB, {} tracker hits)",
                i + 1,
                entry.hostname,
                entry.trust,
                entry.storage_kb,
                entry.tracker_hits_7d
            ));
        }
        lines.join("\n")
    }
}

/// Build the digest for the day containing `now_ms`.
///
/// Excluded hostnames and sites not seen today are skipped; entries sort by
/// ascending trust (riskiest first) with the origin as tie-break.
pub fn build_digest(store: &Store, now_ms: i64, top_n: usize) -> DailyDigest {
    let mut entries: Vec<DigestEntry> = store
        .sites
        .values()
        .filter(|s| !s.hostname.is_empty())
        .filter(|s| !store.is_excluded(&s.hostname))
        .filter(|s| s.seen_on_day(now_ms))
        .map(|s| DigestEntry {
            origin: s.origin.clone(),
            hostname: s.hostname.clone(),
            trust: trust::score(s),
            storage_kb: s.storage_kb(),
            tracker_hits_7d: s.tracker_hits_7d,
        })
        .collect();

    entries.sort_by(|a, b| a.trust.cmp(&b.trust).then_with(|| a.origin.cmp(&b.origin)));
    entries.truncate(top_n);

    DailyDigest { ts: now_ms, entries }
}
