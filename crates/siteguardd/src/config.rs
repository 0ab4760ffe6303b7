//! Daemon configuration.
//!
//! Host-level knobs only: where state lives, where the socket goes, how
//! verbose the logs are. Engine settings travel inside the store document so
//! the dashboard can edit them over IPC.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use siteguard_common::paths;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Directory holding the store document and spool files.
    pub state_dir: PathBuf,

    /// Unix socket the IPC server binds.
    pub socket_path: PathBuf,

    /// tracing env-filter directive, e.g. "info" or "siteguardd=debug".
    pub log_filter: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            state_dir: paths::state_dir(),
            socket_path: paths::socket_path(),
            log_filter: "info".to_string(),
        }
    }
}

impl DaemonConfig {
    /// Load from a TOML file, or defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Default config file location under the XDG config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("siteguard/siteguardd.toml"))
            .unwrap_or_else(|| PathBuf::from("/etc/siteguard/siteguardd.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = DaemonConfig::load(Path::new("/nonexistent/siteguardd.toml")).unwrap();
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("siteguardd.toml");
        std::fs::write(&path, "state_dir = \"/var/lib/siteguard\"\n").unwrap();

        let config = DaemonConfig::load(&path).unwrap();
        assert_eq!(config.state_dir, PathBuf::from("/var/lib/siteguard"));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("siteguardd.toml");
        std::fs::write(&path, "state_dir = [not toml").unwrap();
        assert!(DaemonConfig::load(&path).is_err());
    }
}
