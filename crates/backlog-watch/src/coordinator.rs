//! Registry of active project watchers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{error, info};

use backlog_common_config::{ProjectLayout, ProjectSettings};
use backlog_common_fs::path::absolutize;

use crate::error::WatchError;
use crate::executor::ReconcileExecutor;
use crate::lease::LeaseStore;
use crate::watcher::ProjectWatcher;

/// At most one watcher per absolute project path.
///
/// Registry operations are serialized by a lock. Reconciliations of
/// different projects run independently.
pub struct WatchCoordinator {
    executor: Arc<dyn ReconcileExecutor>,
    settings: ProjectSettings,
    debounce: Duration,
    watchers: Mutex<HashMap<PathBuf, ProjectWatcher>>,
}

impl WatchCoordinator {
    pub fn new(
        executor: Arc<dyn ReconcileExecutor>,
        settings: ProjectSettings,
        debounce: Duration,
    ) -> Self {
        Self {
            executor,
            settings,
            debounce,
            watchers: Mutex::new(HashMap::new()),
        }
    }

    /// Start watching `path`. Returns the absolute path used as the key.
    pub fn start(&self, path: impl AsRef<Path>) -> Result<PathBuf, WatchError> {
        let root = absolutize(path)?;
        let mut watchers = self.watchers.lock();
        if watchers.contains_key(&root) {
            return Err(WatchError::AlreadyWatching { path: root });
        }

        let layout = ProjectLayout::new(&root, &self.settings);
        let watcher = ProjectWatcher::start(layout, self.debounce, Arc::clone(&self.executor))?;
        watchers.insert(root.clone(), watcher);
        Ok(root)
    }

    /// Stop watching `path`.
    pub fn stop(&self, path: impl AsRef<Path>) -> Result<PathBuf, WatchError> {
        let root = absolutize(path)?;
        let mut watcher = self
            .watchers
            .lock()
            .remove(&root)
            .ok_or_else(|| WatchError::NotWatching { path: root.clone() })?;
        watcher.stop()?;
        Ok(root)
    }

    pub fn is_watching(&self, path: impl AsRef<Path>) -> bool {
        absolutize(path)
            .map(|root| self.watchers.lock().contains_key(&root))
            .unwrap_or(false)
    }

    /// Watched project roots, sorted.
    pub fn watched_projects(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self.watchers.lock().keys().cloned().collect();
        roots.sort();
        roots
    }

    pub fn len(&self) -> usize {
        self.watchers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.lock().is_empty()
    }

    /// Stop every watcher. Individual failures are logged and the registry
    /// ends up empty either way.
    pub fn stop_all(&self) -> Vec<PathBuf> {
        let drained: Vec<(PathBuf, ProjectWatcher)> = self.watchers.lock().drain().collect();
        let mut stopped = Vec::with_capacity(drained.len());
        for (root, mut watcher) in drained {
            match watcher.stop() {
                Ok(()) => stopped.push(root),
                Err(err) => error!(project = %root.display(), error = %err, "failed to stop watcher"),
            }
        }
        stopped.sort();
        stopped
    }

    /// Stop every watcher and wait for in-flight reconciliations.
    pub async fn shutdown(&self) -> Vec<PathBuf> {
        let drained: Vec<(PathBuf, ProjectWatcher)> = self.watchers.lock().drain().collect();
        let mut stopped = Vec::with_capacity(drained.len());
        for (root, mut watcher) in drained {
            if let Err(err) = watcher.stop() {
                error!(project = %root.display(), error = %err, "failed to stop watcher");
            }
            watcher.finished().await;
            stopped.push(root);
        }
        stopped.sort();
        stopped
    }

    /// Stop the watchers whose lease has been released.
    pub fn prune_released(&self, leases: &LeaseStore) -> Vec<PathBuf> {
        let released: Vec<PathBuf> = self
            .watchers
            .lock()
            .keys()
            .filter(|root| !leases.holds(root))
            .cloned()
            .collect();

        let mut stopped = Vec::new();
        for root in released {
            match self.stop(&root) {
                Ok(root) => {
                    info!(project = %root.display(), "lease released, watch stopped");
                    stopped.push(root);
                }
                Err(err) => error!(project = %root.display(), error = %err, "failed to stop watcher"),
            }
        }
        stopped.sort();
        stopped
    }
}
