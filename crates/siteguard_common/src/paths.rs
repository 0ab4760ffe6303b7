//! Path helpers for the daemon and client.

use std::path::PathBuf;

/// Socket discovery, in priority order:
/// 1. `$SITEGUARD_SOCKET`
/// 2. `$XDG_RUNTIME_DIR/siteguard/siteguardd.sock`
/// 3. `/tmp/siteguard-<uid>/siteguardd.sock` (fallback)
pub fn socket_path() -> PathBuf {
    if let Ok(path) = std::env::var("SITEGUARD_SOCKET") {
        return PathBuf::from(path);
    }
    runtime_dir().join("siteguardd.sock")
}

/// Runtime directory holding the socket.
pub fn runtime_dir() -> PathBuf {
    if let Ok(xdg_runtime) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(xdg_runtime).join("siteguard")
    } else {
        PathBuf::from(format!("/tmp/siteguard-{}", uid()))
    }
}

/// State directory holding the store document and spool files.
pub fn state_dir() -> PathBuf {
    dirs::state_dir()
        .map(|d| d.join("siteguard"))
        .unwrap_or_else(|| PathBuf::from(format!("/tmp/siteguard-{}/state", uid())))
}

fn uid() -> u32 {
    unsafe { libc::getuid() }
}
