//! Periodic triggers.
//!
//! Two loops: the snapshot interval, re-read from the store each iteration
//! so settings changes apply without a restart, and a minute tick that fires
//! the daily report once per local day at the configured hour. Background
//! failures are logged and retried on the next tick; they never surface to a
//! caller.

use chrono::{Local, NaiveDate, Timelike};
use siteguard_common::store::Settings;
use siteguard_common::{now_ms, report};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::notifier;
use crate::rpc_server::DaemonState;
use crate::snapshot::{self, SnapshotReason};

/// Spawn the snapshot interval loop.
pub fn spawn_snapshot_scheduler(state: Arc<DaemonState>) {
    tokio::spawn(async move {
        loop {
            let minutes = match state.store.load().await {
                Ok(db) => db.settings.snapshot_interval_minutes.max(1),
                Err(e) => {
                    warn!("could not read snapshot interval, using default: {e:#}");
                    Settings::default().snapshot_interval_minutes
                }
            };
            sleep(Duration::from_secs(minutes * 60)).await;

            if let Err(e) =
                snapshot::run_snapshot(&state.store, state.feed.as_ref(), SnapshotReason::Scheduled)
                    .await
            {
                warn!("scheduled snapshot failed, will retry next tick: {e:#}");
            }
        }
    });
}

/// Spawn the daily report loop.
///
/// Minute granularity with a fired-day guard: the report goes out during the
/// configured local hour at most once per day, and reconfiguration over IPC
/// is picked up on the next tick.
pub fn spawn_daily_report_scheduler(state: Arc<DaemonState>) {
    tokio::spawn(async move {
        let mut last_fired_day: Option<NaiveDate> = None;
        loop {
            sleep(Duration::from_secs(60)).await;

            let db = match state.store.load().await {
                Ok(db) => db,
                Err(e) => {
                    warn!("daily report check could not read store: {e:#}");
                    continue;
                }
            };
            if !db.settings.daily_report_enabled {
                continue;
            }

            let now_local = Local::now();
            if now_local.hour() != u32::from(db.settings.daily_report_hour_local) {
                continue;
            }
            let today = now_local.date_naive();
            if last_fired_day == Some(today) {
                continue;
            }
            last_fired_day = Some(today);

            let digest = report::build_digest(&db, now_ms(), db.settings.daily_report_top_n);
            if digest.is_empty() {
                info!("daily report: no sites observed today, skipping");
                continue;
            }

            let id = format!("sg_daily_{}", digest.ts);
            notifier::notify(&id, &digest.title(), &digest.message()).await;
            info!("daily report sent ({} entries)", digest.entries.len());
        }
    });
}
