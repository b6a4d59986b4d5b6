//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacklogConfig {
    /// Project layout configuration.
    pub project: ProjectSettings,
    /// Watch mode configuration.
    pub watch: WatchSettings,
}

/// Where the backlog lives and how its parts are named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Default project directory, relative to the working directory.
    pub root: PathBuf,
    /// Epic subdirectory name.
    pub epic_dir: String,
    /// Issue subdirectory name.
    pub issues_dir: String,
    /// Priority list file name.
    pub priority_file: String,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("projects"),
            epic_dir: "epic".to_string(),
            issues_dir: "issues".to_string(),
            priority_file: "order.csv".to_string(),
        }
    }
}

/// Watch mode configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    /// Quiet period after the last change before reconciling (ms).
    pub debounce_ms: u64,
    /// How often a running watch checks its leases (ms).
    pub lease_poll_ms: u64,
    /// Directory holding watch leases. Defaults to the user data dir.
    pub state_dir: Option<PathBuf>,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            lease_poll_ms: 1000,
            state_dir: None,
        }
    }
}

impl WatchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn lease_poll(&self) -> Duration {
        Duration::from_millis(self.lease_poll_ms)
    }

    /// Resolved lease directory.
    pub fn lease_dir(&self) -> PathBuf {
        match &self.state_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("instant-backlog")
                .join("watches"),
        }
    }
}
