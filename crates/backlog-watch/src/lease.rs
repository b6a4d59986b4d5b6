//! Watch leases.
//!
//! A running `watch` process holds one lease file per project it watches.
//! `unwatch` removes lease files; the watch process notices on its next
//! poll and stops the matching watcher.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use backlog_common_fs as bfs;

use crate::error::WatchError;

const LEASE_EXTENSION: &str = "lease";

/// Contents of a lease file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchLease {
    pub project: PathBuf,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
}

/// Directory of lease files, one per watched project.
#[derive(Debug, Clone)]
pub struct LeaseStore {
    dir: PathBuf,
}

impl LeaseStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lease file for `project`. The absolute path is percent-encoded into a
    /// single file name.
    pub fn lease_path(&self, project: &Path) -> PathBuf {
        let mut name = String::new();
        for c in project.to_string_lossy().chars() {
            match c {
                '%' => name.push_str("%25"),
                '/' => name.push_str("%2F"),
                '\\' => name.push_str("%5C"),
                ':' => name.push_str("%3A"),
                c => name.push(c),
            }
        }
        name.push('.');
        name.push_str(LEASE_EXTENSION);
        self.dir.join(name)
    }

    /// Take the lease for `project` on behalf of this process.
    pub fn acquire(&self, project: &Path) -> Result<WatchLease, WatchError> {
        bfs::ensure_dir(&self.dir)?;
        let path = self.lease_path(project);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                let held = self.read_lease(&path)?;
                return Err(WatchError::LeaseHeld {
                    project: project.to_path_buf(),
                    pid: held.pid,
                });
            }
            Err(err) => return Err(WatchError::lease(&path, err)),
        };

        let lease = WatchLease {
            project: project.to_path_buf(),
            pid: std::process::id(),
            started_at: Utc::now(),
        };
        let yaml = serde_yaml::to_string(&lease).map_err(|e| WatchError::lease(&path, e))?;
        file.write_all(yaml.as_bytes())
            .map_err(|e| WatchError::lease(&path, e))?;

        debug!(project = %project.display(), lease = %path.display(), "lease acquired");
        Ok(lease)
    }

    /// Remove the lease for `project`. Returns whether one existed.
    pub fn release(&self, project: &Path) -> Result<bool, WatchError> {
        let released = bfs::remove_file_if_exists(self.lease_path(project))?;
        if released {
            debug!(project = %project.display(), "lease released");
        }
        Ok(released)
    }

    /// Remove every lease. Returns the projects that were released.
    pub fn release_all(&self) -> Result<Vec<PathBuf>, WatchError> {
        let mut released = Vec::new();
        for lease in self.list()? {
            if self.release(&lease.project)? {
                released.push(lease.project);
            }
        }
        Ok(released)
    }

    pub fn holds(&self, project: &Path) -> bool {
        self.lease_path(project).is_file()
    }

    /// All readable leases, sorted by project. Unreadable files are skipped.
    pub fn list(&self) -> Result<Vec<WatchLease>, WatchError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(WatchError::lease(&self.dir, err)),
        };

        let mut leases = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| WatchError::lease(&self.dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(LEASE_EXTENSION) {
                continue;
            }
            match self.read_lease(&path) {
                Ok(lease) => leases.push(lease),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable lease"),
            }
        }

        leases.sort_by(|a, b| a.project.cmp(&b.project));
        Ok(leases)
    }

    fn read_lease(&self, path: &Path) -> Result<WatchLease, WatchError> {
        let text = fs::read_to_string(path).map_err(|e| WatchError::lease(path, e))?;
        serde_yaml::from_str(&text).map_err(|e| WatchError::lease(path, e))
    }
}
