//! Best-effort user notifications.
//!
//! Shells out to notify-send when available. Delivery is not guaranteed and
//! failures never propagate; the deterministic id ties log lines back to the
//! originating alert.

use tracing::{debug, warn};

/// Send one notification. Never fails: a missing notify-send binary or a
/// non-zero exit only logs.
pub async fn notify(id: &str, title: &str, message: &str) {
    debug!("notification {id}: {title}");

    let result = tokio::process::Command::new("notify-send")
        .arg("--app-name")
        .arg("siteguard")
        .arg(title)
        .arg(message)
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => {}
        Ok(_) => warn!("notify-send failed for notification {id}"),
        Err(e) => warn!("could not run notify-send for notification {id}: {e}"),
    }
}
