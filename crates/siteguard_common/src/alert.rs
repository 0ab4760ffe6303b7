//! Storage-growth alert policy.

use serde::{Deserialize, Serialize};

use crate::store::Site;

/// Minimum spacing between alerts for one site.
pub const COOLDOWN_MS: i64 = 60 * 60 * 1000;

/// Per-site thresholds are clamped into this range.
pub const MAX_THRESHOLD_KB: u64 = 999_999;

/// A growth alert ready for notification dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAlert {
    /// Deterministic, collision-resistant notification id.
    pub id: String,
    pub hostname: String,
    pub delta_kb: u64,
    pub threshold_kb: u64,
    pub ts: i64,
}

impl StorageAlert {
    pub fn title(&self) -> String {
        "siteguard alert".to_string()
    }

    pub fn message(&self) -> String {
        format!(
            "{} storage jumped +{} KB (threshold {} KB)",
            self.hostname, self.delta_kb, self.threshold_kb
        )
    }
}

/// Evaluate the growth policy for one snapshot cycle.
///
/// `prev_storage_kb` is the storage figure of the last history point before
/// the point appended this cycle; on a first observation callers pass the
/// current figure, which makes the delta zero. Emits at most once per
/// cooldown window and advances `last_alerted_at` on emit. Suppression is
/// silent and final for the cycle; there is no retry.
pub fn evaluate(
    site: &mut Site,
    default_threshold_kb: u64,
    prev_storage_kb: u64,
    now_ms: i64,
) -> Option<StorageAlert> {
    let storage_kb = site.storage_kb();
    if storage_kb <= prev_storage_kb {
        return None;
    }
    let delta_kb = storage_kb - prev_storage_kb;

    // A zero threshold means "never overridden"; fall back to the setting.
    let threshold_kb = if site.threshold_kb > 0 {
        site.threshold_kb
    } else {
        default_threshold_kb
    };

    if site.last_alerted_at != 0 && now_ms - site.last_alerted_at < COOLDOWN_MS {
        return None;
    }

    if delta_kb < threshold_kb {
        return None;
    }

    site.last_alerted_at = now_ms;
    Some(StorageAlert {
        id: format!("sg_{}_{}", site.hostname, now_ms),
        hostname: site.hostname.clone(),
        delta_kb,
        threshold_kb,
        ts: now_ms,
    })
}
