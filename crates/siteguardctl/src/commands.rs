//! Command implementations.

use anyhow::{bail, Result};
use chrono::{Local, TimeZone};
use owo_colors::OwoColorize;
use siteguard_common::ipc::{Method, ResponseData};
use siteguard_common::store::{Site, Store};
use siteguard_common::{history, origin};
use std::path::Path;

use crate::rpc_client::RpcClient;

async fn fetch_state(socket: Option<&Path>) -> Result<Store> {
    let mut client = RpcClient::connect(socket).await?;
    match client.call(Method::GetState).await? {
        ResponseData::State(store) => Ok(store),
        other => bail!("unexpected response: {other:?}"),
    }
}

fn fmt_ts(ts: i64) -> String {
    if ts == 0 {
        return "never".to_string();
    }
    match Local.timestamp_millis_opt(ts) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        _ => ts.to_string(),
    }
}

/// Trust figure shown for a site: the latest snapshot value, or the
/// defined default when no cycle has run yet.
fn shown_trust(site: &Site) -> u8 {
    history::latest(site).trust
}

pub async fn status(socket: Option<&Path>) -> Result<()> {
    let store = fetch_state(socket).await?;

    println!("{}", "siteguard".bold());
    println!("  sites tracked:     {}", store.sites.len());
    println!("  exclusions:        {}", store.exclusions.hostnames.len());
    println!(
        "  last snapshot:     {} ({})",
        fmt_ts(store.meta.last_snapshot_at),
        if store.meta.last_snapshot_reason.is_empty() {
            "none"
        } else {
            &store.meta.last_snapshot_reason
        }
    );
    println!(
        "  snapshot interval: {} min",
        store.settings.snapshot_interval_minutes
    );
    println!(
        "  default threshold: {} KB",
        store.settings.default_threshold_kb
    );
    println!(
        "  history retention: {} days",
        store.settings.history_retention_days
    );
    println!(
        "  daily report:      {}",
        if store.settings.daily_report_enabled {
            format!("enabled at {:02}:00", store.settings.daily_report_hour_local)
        } else {
            "disabled".to_string()
        }
    );
    Ok(())
}

pub async fn sites(socket: Option<&Path>, limit: usize) -> Result<()> {
    let store = fetch_state(socket).await?;
    if store.sites.is_empty() {
        println!("No sites tracked yet.");
        return Ok(());
    }

    let mut sites: Vec<&Site> = store.sites.values().collect();
    sites.sort_by(|a, b| {
        shown_trust(a)
            .cmp(&shown_trust(b))
            .then_with(|| a.origin.cmp(&b.origin))
    });

    println!(
        "{}",
        format!(
            "{:<44} {:>5} {:>12} {:>9} {:>8}",
            "ORIGIN", "TRUST", "STORAGE KB", "TRACKERS", "COOKIES"
        )
        .bold()
    );
    for site in sites.iter().take(limit) {
        let trust = shown_trust(site);
        let line = format!(
            "{:<44} {:>5} {:>12} {:>9} {:>8}",
            site.origin,
            trust,
            site.storage_kb(),
            site.tracker_hits_7d,
            site.cookies_count
        );
        if trust < 40 {
            println!("{}", line.red());
        } else if trust < 70 {
            println!("{}", line.yellow());
        } else {
            println!("{line}");
        }
    }
    if store.sites.len() > limit {
        println!("... and {} more", store.sites.len() - limit);
    }
    Ok(())
}

pub async fn site(socket: Option<&Path>, origin_arg: String) -> Result<()> {
    let store = fetch_state(socket).await?;

    // Accept both a full URL and an already-normalized origin.
    let key = origin::parse_origin(&origin_arg).unwrap_or_else(|| origin_arg.clone());
    let Some(site) = store.sites.get(&key) else {
        bail!("no such site: {key}");
    };

    println!("{}", site.origin.bold());
    println!("  hostname:            {}", site.hostname);
    if store.is_excluded(&site.hostname) {
        println!("  {}", "excluded from tracking".yellow());
    }
    println!("  last seen:           {}", fmt_ts(site.last_seen));
    println!("  trust:               {}", shown_trust(site));
    println!(
        "  storage:             {} KB ({} persistent / {} session bytes)",
        site.storage_kb(),
        site.persistent_bytes,
        site.session_bytes
    );
    println!(
        "  cookies:             {} ({} third-party, ~{} bytes)",
        site.cookies_count, site.third_party_cookies, site.cookies_bytes_estimate
    );
    println!(
        "  service worker:      {}",
        if site.service_worker_present { "yes" } else { "no" }
    );
    println!("  tracker hits (7d):   {}", site.tracker_hits_7d);
    println!("  storage events (7d): {}", site.storage_events_7d);
    println!("  alert threshold:     {} KB", site.threshold_kb);
    println!("  last alerted:        {}", fmt_ts(site.last_alerted_at));

    if !site.history.is_empty() {
        let shown = site.history.len().min(10);
        println!("  history (last {shown}):");
        for point in site.history.iter().skip(site.history.len() - shown) {
            println!(
                "    {}  trust {:>3}  {:>8} KB  {:>5} tracker hits",
                fmt_ts(point.ts),
                point.trust,
                point.storage_kb,
                point.tracker_hits_7d
            );
        }
    }
    Ok(())
}

pub async fn snapshot(socket: Option<&Path>) -> Result<()> {
    let mut client = RpcClient::connect(socket).await?;
    match client.call(Method::SnapshotNow).await? {
        ResponseData::Snapshot {
            sites_updated,
            alerts_sent,
        } => {
            println!("Snapshot complete: {sites_updated} sites updated, {alerts_sent} alerts.");
            Ok(())
        }
        other => bail!("unexpected response: {other:?}"),
    }
}

pub async fn exclude(socket: Option<&Path>, hostname: String, remove: bool) -> Result<()> {
    let mut client = RpcClient::connect(socket).await?;
    client
        .call(Method::SetExcluded {
            hostname: hostname.clone(),
            excluded: !remove,
        })
        .await?;
    if remove {
        println!("{hostname} is tracked again.");
    } else {
        println!("{hostname} excluded from tracking.");
    }
    Ok(())
}

pub async fn threshold(socket: Option<&Path>, origin: String, threshold_kb: u64) -> Result<()> {
    let mut client = RpcClient::connect(socket).await?;
    client
        .call(Method::SetThreshold {
            origin: origin.clone(),
            threshold_kb,
        })
        .await?;
    println!("Alert threshold for {origin} set to {threshold_kb} KB.");
    Ok(())
}

pub async fn clear(socket: Option<&Path>, origin: String) -> Result<()> {
    let mut client = RpcClient::connect(socket).await?;
    client
        .call(Method::ClearSite {
            origin: origin.clone(),
        })
        .await?;
    println!("Cleared accumulated data for {origin}.");
    Ok(())
}

pub async fn cookies(socket: Option<&Path>, origin: String) -> Result<()> {
    let mut client = RpcClient::connect(socket).await?;
    match client.call(Method::RefreshCookies { origin }).await? {
        ResponseData::Cookies(stats) => {
            println!(
                "{} cookies ({} third-party), ~{} bytes",
                stats.cookies_count, stats.third_party_cookies, stats.cookies_bytes_estimate
            );
            Ok(())
        }
        other => bail!("unexpected response: {other:?}"),
    }
}

pub async fn report(
    socket: Option<&Path>,
    enabled: Option<bool>,
    hour: Option<u32>,
) -> Result<()> {
    if enabled.is_none() && hour.is_none() {
        bail!("nothing to change: pass --enabled and/or --hour");
    }

    let mut client = RpcClient::connect(socket).await?;
    if let Some(enabled) = enabled {
        client.call(Method::SetDailyReport { enabled }).await?;
        println!(
            "Daily report {}.",
            if enabled { "enabled" } else { "disabled" }
        );
    }
    if let Some(hour) = hour {
        client.call(Method::SetDailyReportHour { hour }).await?;
        println!("Daily report hour set to {hour:02}:00.");
    }
    Ok(())
}

pub async fn state(socket: Option<&Path>) -> Result<()> {
    let store = fetch_state(socket).await?;
    println!("{}", serde_json::to_string_pretty(&store)?);
    Ok(())
}
