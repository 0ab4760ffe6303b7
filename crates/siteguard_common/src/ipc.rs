//! IPC protocol between siteguardd and its clients.
//!
//! Line-delimited JSON over a unix socket: one request per line, one
//! response per line, matched by id. Verbs are transport-neutral; the
//! dashboard and the page collector both speak this surface.

use serde::{Deserialize, Serialize};

use crate::cookies::CookieStats;
use crate::store::Store;

/// IPC request from client to daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub method: Method,
}

/// IPC response from daemon to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    pub result: Result<ResponseData, String>,
}

/// Request verbs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum Method {
    /// Read the full store document.
    GetState,

    /// Run a snapshot cycle immediately.
    SnapshotNow,

    /// Apply a metrics report from the page collector. Byte fields left out
    /// keep their stored values.
    ReportMetrics {
        origin: String,
        persistent_bytes: Option<u64>,
        session_bytes: Option<u64>,
        service_worker_present: bool,
        storage_events_delta: u64,
    },

    /// Re-query cookies for an origin and store the derived stats.
    RefreshCookies { origin: String },

    /// Add or remove a hostname exclusion.
    SetExcluded { hostname: String, excluded: bool },

    /// Override the per-origin growth alert threshold.
    SetThreshold { origin: String, threshold_kb: u64 },

    /// Reset accumulated data for an origin and ask its pages to clear
    /// their storage.
    ClearSite { origin: String },

    /// Enable or disable the daily report.
    SetDailyReport { enabled: bool },

    /// Local hour (0-23) the daily report fires.
    SetDailyReportHour { hour: u32 },

    /// Health check.
    Ping,
}

/// Response data variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ResponseData {
    /// Full store document.
    State(Store),

    /// Cookie stats after a refresh.
    Cookies(CookieStats),

    /// Snapshot cycle summary.
    Snapshot {
        sites_updated: usize,
        alerts_sent: usize,
    },

    /// Simple success / pong.
    Ok,
}
