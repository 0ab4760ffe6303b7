//! IPC verb handlers.
//!
//! Each handler is one or more read-modify-write cycles against the store.
//! Excluded origins silently no-op on metric and cookie verbs; validation
//! failures reject before anything is mutated. Handlers never panic the
//! daemon: every failure becomes a structured error result on the wire.

use siteguard_common::alert::MAX_THRESHOLD_KB;
use siteguard_common::cookies::{self, CookieStats};
use siteguard_common::error::ValidationError;
use siteguard_common::ipc::{Method, Request, Response, ResponseData};
use siteguard_common::{now_ms, origin};
use tracing::{info, warn};

use crate::rpc_server::DaemonState;
use crate::snapshot::{self, SnapshotReason};

pub async fn handle_request(request: Request, state: &DaemonState) -> Response {
    let result = dispatch(request.method, state).await;
    Response {
        id: request.id,
        result,
    }
}

async fn dispatch(method: Method, state: &DaemonState) -> Result<ResponseData, String> {
    match method {
        Method::Ping => Ok(ResponseData::Ok),
        Method::GetState => handle_get_state(state).await,
        Method::SnapshotNow => handle_snapshot_now(state).await,
        Method::ReportMetrics {
            origin,
            persistent_bytes,
            session_bytes,
            service_worker_present,
            storage_events_delta,
        } => {
            handle_report_metrics(
                state,
                origin,
                persistent_bytes,
                session_bytes,
                service_worker_present,
                storage_events_delta,
            )
            .await
        }
        Method::RefreshCookies { origin } => handle_refresh_cookies(state, origin).await,
        Method::SetExcluded { hostname, excluded } => {
            handle_set_excluded(state, hostname, excluded).await
        }
        Method::SetThreshold {
            origin,
            threshold_kb,
        } => handle_set_threshold(state, origin, threshold_kb).await,
        Method::ClearSite { origin } => handle_clear_site(state, origin).await,
        Method::SetDailyReport { enabled } => handle_set_daily_report(state, enabled).await,
        Method::SetDailyReportHour { hour } => handle_set_daily_report_hour(state, hour).await,
    }
}

/// Parse and normalize an origin, yielding (origin, hostname).
fn parse_origin(input: &str) -> Result<(String, String), String> {
    let Some(origin_norm) = origin::parse_origin(input) else {
        return Err(ValidationError::InvalidOrigin(input.to_string()).to_string());
    };
    let Some(hostname) = origin::hostname(&origin_norm) else {
        return Err(ValidationError::MissingHostname.to_string());
    };
    Ok((origin_norm, hostname))
}

async fn handle_get_state(state: &DaemonState) -> Result<ResponseData, String> {
    state
        .store
        .load()
        .await
        .map(ResponseData::State)
        .map_err(|e| format!("{e:#}"))
}

async fn handle_snapshot_now(state: &DaemonState) -> Result<ResponseData, String> {
    match snapshot::run_snapshot(&state.store, state.feed.as_ref(), SnapshotReason::OnDemand).await
    {
        Ok(outcome) => Ok(ResponseData::Snapshot {
            sites_updated: outcome.sites_updated,
            alerts_sent: outcome.alerts,
        }),
        Err(e) => Err(format!("snapshot failed: {e:#}")),
    }
}

async fn handle_report_metrics(
    state: &DaemonState,
    origin: String,
    persistent_bytes: Option<u64>,
    session_bytes: Option<u64>,
    service_worker_present: bool,
    storage_events_delta: u64,
) -> Result<ResponseData, String> {
    let (origin_norm, hostname) = parse_origin(&origin)?;
    let now = now_ms();

    state
        .store
        .with_transaction(|db| {
            // Excluded hostnames are a silent no-op, not an error.
            if db.is_excluded(&hostname) {
                return Ok(());
            }
            let site = db.site_mut(&origin_norm, &hostname);
            site.mark_seen(now);
            if let Some(bytes) = persistent_bytes {
                site.persistent_bytes = bytes;
            }
            if let Some(bytes) = session_bytes {
                site.session_bytes = bytes;
            }
            site.service_worker_present = service_worker_present;
            if storage_events_delta > 0 {
                site.add_storage_events(now, storage_events_delta);
            }
            Ok(())
        })
        .await
        .map_err(|e| format!("{e:#}"))?;

    Ok(ResponseData::Ok)
}

async fn handle_refresh_cookies(
    state: &DaemonState,
    origin: String,
) -> Result<ResponseData, String> {
    let (origin_norm, hostname) = parse_origin(&origin)?;

    let excluded = state
        .store
        .load()
        .await
        .map_err(|e| format!("{e:#}"))?
        .is_excluded(&hostname);
    if excluded {
        return Ok(ResponseData::Cookies(CookieStats::default()));
    }

    // Query outside the store transaction; a failed source degrades to an
    // empty jar.
    let jar = match state.cookies.cookies_for(&origin_norm).await {
        Ok(jar) => jar,
        Err(e) => {
            warn!("cookie source unavailable for {origin_norm}: {e:#}");
            Vec::new()
        }
    };
    let stats = cookies::cookie_stats(&hostname, &jar);

    state
        .store
        .with_transaction(|db| {
            if db.is_excluded(&hostname) {
                return Ok(());
            }
            let site = db.site_mut(&origin_norm, &hostname);
            site.cookies_count = stats.cookies_count;
            site.cookies_bytes_estimate = stats.cookies_bytes_estimate;
            site.third_party_cookies = stats.third_party_cookies;
            Ok(())
        })
        .await
        .map_err(|e| format!("{e:#}"))?;

    Ok(ResponseData::Cookies(stats))
}

async fn handle_set_excluded(
    state: &DaemonState,
    hostname: String,
    excluded: bool,
) -> Result<ResponseData, String> {
    if hostname.trim().is_empty() {
        return Err(ValidationError::MissingHostname.to_string());
    }

    state
        .store
        .with_transaction(|db| {
            if excluded {
                db.exclusions.hostnames.insert(hostname.clone());
            } else {
                db.exclusions.hostnames.remove(&hostname);
            }
            Ok(())
        })
        .await
        .map_err(|e| format!("{e:#}"))?;

    info!(
        "exclusion {} for {hostname}",
        if excluded { "added" } else { "removed" }
    );
    Ok(ResponseData::Ok)
}

async fn handle_set_threshold(
    state: &DaemonState,
    origin: String,
    threshold_kb: u64,
) -> Result<ResponseData, String> {
    let (origin_norm, hostname) = parse_origin(&origin)?;
    let clamped = threshold_kb.min(MAX_THRESHOLD_KB);

    state
        .store
        .with_transaction(|db| {
            let site = db.site_mut(&origin_norm, &hostname);
            site.threshold_kb = clamped;
            Ok(())
        })
        .await
        .map_err(|e| format!("{e:#}"))?;

    Ok(ResponseData::Ok)
}

async fn handle_clear_site(state: &DaemonState, origin: String) -> Result<ResponseData, String> {
    let (origin_norm, hostname) = parse_origin(&origin)?;

    // Fan out the page-side clear first. Best effort: failures are logged
    // and never block the reset.
    if let Err(e) = state.pages.clear_storage(&origin_norm).await {
        warn!("page clear broadcast failed for {origin_norm}: {e:#}");
    }

    state
        .store
        .with_transaction(|db| {
            let site = db.site_mut(&origin_norm, &hostname);
            site.clear();
            Ok(())
        })
        .await
        .map_err(|e| format!("{e:#}"))?;

    info!("cleared accumulated data for {origin_norm}");
    Ok(ResponseData::Ok)
}

async fn handle_set_daily_report(
    state: &DaemonState,
    enabled: bool,
) -> Result<ResponseData, String> {
    state
        .store
        .with_transaction(|db| {
            db.settings.daily_report_enabled = enabled;
            Ok(())
        })
        .await
        .map_err(|e| format!("{e:#}"))?;
    Ok(ResponseData::Ok)
}

async fn handle_set_daily_report_hour(
    state: &DaemonState,
    hour: u32,
) -> Result<ResponseData, String> {
    if hour > 23 {
        return Err(ValidationError::InvalidHour(hour).to_string());
    }
    state
        .store
        .with_transaction(|db| {
            db.settings.daily_report_hour_local = hour as u8;
            Ok(())
        })
        .await
        .map_err(|e| format!("{e:#}"))?;
    Ok(ResponseData::Ok)
}
