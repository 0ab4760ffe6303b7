//! Attribution of network-rule matches to an owning top-level origin.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::origin;

/// One network-rule match reported by the blocking layer. Either identifier
/// may be missing depending on how the match was observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleMatch {
    /// Epoch ms the match was recorded.
    pub ts: i64,
    /// Live browsing-context identifier, when the blocking layer had one.
    pub context_id: Option<u64>,
    /// URL of the resource that initiated the request.
    pub initiator_url: Option<String>,
}

/// Roll matches up into origin -> count.
///
/// Context attribution wins when the side table resolves the id: it reflects
/// the tab's current top document. The initiator origin is the weaker proxy
/// used when context tracking is stale or missing; it can misattribute
/// cross-origin redirect chains, which is a known heuristic limitation.
/// Events resolving to neither are dropped: an attribution miss, not an
/// error.
pub fn attribute<F>(events: &[RuleMatch], context_lookup: F) -> BTreeMap<String, u64>
where
    F: Fn(u64) -> Option<String>,
{
    let mut counts = BTreeMap::new();
    for event in events {
        let resolved = event
            .context_id
            .and_then(&context_lookup)
            .or_else(|| event.initiator_url.as_deref().and_then(origin::parse_origin));
        if let Some(origin) = resolved {
            *counts.entry(origin).or_insert(0u64) += 1;
        }
    }
    counts
}
