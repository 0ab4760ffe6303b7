//! The snapshot cycle.
//!
//! Pulls tracker matches for the window since the last successful run,
//! attributes them to origins, bumps rolling counters, appends one history
//! point per tracked site and evaluates the growth alert policy, all inside
//! one store transaction. Collaborator failures degrade to empty inputs; a
//! store failure aborts the cycle without advancing the pull window, so the
//! next run retries it.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use siteguard_common::alert::{self, StorageAlert};
use siteguard_common::store::HistoryPoint;
use siteguard_common::{attribution, history, now_ms, origin, trust, DAY_MS};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::feeds::TrackerFeed;
use crate::notifier;
use crate::store::StoreHandle;

/// Why a cycle ran; recorded in store meta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotReason {
    Scheduled,
    OnDemand,
}

impl std::fmt::Display for SnapshotReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::OnDemand => write!(f, "on_demand"),
        }
    }
}

/// Outcome summary returned to on-demand callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotOutcome {
    pub attributed_origins: usize,
    pub sites_updated: usize,
    pub alerts: usize,
}

/// Run one snapshot cycle.
pub async fn run_snapshot(
    store: &StoreHandle,
    feed: &dyn TrackerFeed,
    reason: SnapshotReason,
) -> Result<SnapshotOutcome> {
    let now = now_ms();

    // Pull window: since the last successful snapshot, floored at a 24h
    // lookback against clock anomalies and missed cycles.
    let last_snapshot_at = store.load().await?.meta.last_snapshot_at;
    let since = last_snapshot_at.max(now - DAY_MS);

    let matches = match feed.matches_since(since).await {
        Ok(matches) => matches,
        Err(e) => {
            warn!("tracker feed unavailable, continuing with no matches: {e:#}");
            Vec::new()
        }
    };
    let contexts: HashMap<u64, String> = match feed.context_table().await {
        Ok(table) => table,
        Err(e) => {
            warn!("context table unavailable, falling back to initiators: {e:#}");
            HashMap::new()
        }
    };

    let by_origin = attribution::attribute(&matches, |id| contexts.get(&id).cloned());
    debug!(
        "attributed {} matches to {} origins",
        matches.len(),
        by_origin.len()
    );

    let (alerts, sites_updated) = store
        .with_transaction(|db| {
            for (origin_str, count) in &by_origin {
                let Some(hostname) = origin::hostname(origin_str) else {
                    continue;
                };
                if hostname.is_empty() || db.is_excluded(&hostname) {
                    continue;
                }
                let site = db.site_mut(origin_str, &hostname);
                site.mark_seen(now);
                site.add_tracker_hits(now, *count);
            }

            // One history point per tracked site, even with no new trackers.
            let retention = db.settings.history_retention_days;
            let default_threshold = db.settings.default_threshold_kb;
            let exclusions = db.exclusions.hostnames.clone();

            let mut alerts: Vec<StorageAlert> = Vec::new();
            let mut sites_updated = 0usize;

            for site in db.sites.values_mut() {
                if site.hostname.is_empty() || exclusions.contains(&site.hostname) {
                    continue;
                }

                site.refresh_counters(now);
                let trust = trust::score(site);

                history::prune(site, retention, now);

                // Growth compares against the last point before this cycle's
                // append; the first observation yields a zero delta.
                let prev_storage_kb = site
                    .history
                    .last()
                    .map(|p| p.storage_kb)
                    .unwrap_or_else(|| site.storage_kb());

                history::append(
                    site,
                    HistoryPoint {
                        ts: now,
                        storage_kb: site.storage_kb(),
                        tracker_hits_7d: site.tracker_hits_7d,
                        trust,
                    },
                );

                if let Some(alert) =
                    alert::evaluate(site, default_threshold, prev_storage_kb, now)
                {
                    alerts.push(alert);
                }
                sites_updated += 1;
            }

            db.meta.last_snapshot_at = now;
            db.meta.last_snapshot_reason = reason.to_string();

            Ok((alerts, sites_updated))
        })
        .await?;

    // Dispatch after the save: an aborted cycle must not notify, and a
    // failed notification must not fail the cycle.
    for alert in &alerts {
        notifier::notify(&alert.id, &alert.title(), &alert.message()).await;
    }

    let outcome = SnapshotOutcome {
        attributed_origins: by_origin.len(),
        sites_updated,
        alerts: alerts.len(),
    };
    info!(
        "snapshot complete ({reason}): {} origins attributed, {} sites updated, {} alerts",
        outcome.attributed_origins, outcome.sites_updated, outcome.alerts
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::FakeCollaborators;
    use siteguard_common::attribution::RuleMatch;
    use tempfile::TempDir;

    fn match_with_initiator(initiator: &str) -> RuleMatch {
        RuleMatch {
            ts: now_ms(),
            context_id: None,
            initiator_url: Some(initiator.to_string()),
        }
    }

    #[tokio::test]
    async fn cycle_creates_sites_and_appends_history() {
        let dir = TempDir::new().unwrap();
        let store = StoreHandle::new(dir.path());
        let feed = FakeCollaborators {
            matches: vec![
                match_with_initiator("https://news.example/article"),
                match_with_initiator("https://news.example/other"),
            ],
            ..Default::default()
        };

        let outcome = run_snapshot(&store, &feed, SnapshotReason::OnDemand)
            .await
            .unwrap();
        assert_eq!(outcome.attributed_origins, 1);
        assert_eq!(outcome.sites_updated, 1);

        let db = store.load().await.unwrap();
        let site = &db.sites["https://news.example"];
        assert_eq!(site.tracker_hits_7d, 2);
        assert_eq!(site.history.len(), 1);
        assert_eq!(site.history[0].tracker_hits_7d, 2);
        assert!(db.meta.last_snapshot_at > 0);
        assert_eq!(db.meta.last_snapshot_reason, "on_demand");
    }

    #[tokio::test]
    async fn context_table_beats_initiator() {
        let dir = TempDir::new().unwrap();
        let store = StoreHandle::new(dir.path());

        let mut feed = FakeCollaborators::default();
        feed.contexts.insert(9, "https://top.example".to_string());
        feed.matches = vec![RuleMatch {
            ts: now_ms(),
            context_id: Some(9),
            initiator_url: Some("https://cdn.example/lib.js".to_string()),
        }];

        run_snapshot(&store, &feed, SnapshotReason::Scheduled)
            .await
            .unwrap();

        let db = store.load().await.unwrap();
        assert!(db.sites.contains_key("https://top.example"));
        assert!(!db.sites.contains_key("https://cdn.example"));
    }

    #[tokio::test]
    async fn excluded_hostnames_accumulate_nothing() {
        let dir = TempDir::new().unwrap();
        let store = StoreHandle::new(dir.path());
        store
            .with_transaction(|db| {
                db.exclusions.hostnames.insert("blocked.example".to_string());
                Ok(())
            })
            .await
            .unwrap();

        let feed = FakeCollaborators {
            matches: vec![match_with_initiator("https://blocked.example/page")],
            ..Default::default()
        };
        let outcome = run_snapshot(&store, &feed, SnapshotReason::Scheduled)
            .await
            .unwrap();

        assert_eq!(outcome.sites_updated, 0);
        let db = store.load().await.unwrap();
        assert!(!db.sites.contains_key("https://blocked.example"));
    }

    #[tokio::test]
    async fn feed_failure_still_completes_the_cycle() {
        let dir = TempDir::new().unwrap();
        let store = StoreHandle::new(dir.path());
        let feed = FakeCollaborators {
            fail_feed: true,
            ..Default::default()
        };

        let outcome = run_snapshot(&store, &feed, SnapshotReason::Scheduled)
            .await
            .unwrap();
        assert_eq!(outcome.attributed_origins, 0);

        // The window still advances: partial data, completed cycle.
        let db = store.load().await.unwrap();
        assert!(db.meta.last_snapshot_at > 0);
        assert_eq!(db.meta.last_snapshot_reason, "scheduled");
    }

    #[tokio::test]
    async fn each_cycle_appends_exactly_one_point() {
        let dir = TempDir::new().unwrap();
        let store = StoreHandle::new(dir.path());
        let feed = FakeCollaborators {
            matches: vec![match_with_initiator("https://news.example/a")],
            ..Default::default()
        };

        run_snapshot(&store, &feed, SnapshotReason::Scheduled).await.unwrap();
        run_snapshot(&store, &feed, SnapshotReason::Scheduled).await.unwrap();

        let db = store.load().await.unwrap();
        assert_eq!(db.sites["https://news.example"].history.len(), 2);
    }
}
