//! Watch errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from starting, stopping or tracking watches.
///
/// Every state error is returned before anything is changed.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("project is already being watched: {}", path.display())]
    AlreadyWatching { path: PathBuf },

    #[error("project is not being watched: {}", path.display())]
    NotWatching { path: PathBuf },

    #[error("project directory does not exist: {}", path.display())]
    ProjectNotFound { path: PathBuf },

    #[error("issues directory does not exist: {}", path.display())]
    IssuesDirMissing { path: PathBuf },

    #[error("watcher is not running: {}", path.display())]
    NotRunning { path: PathBuf },

    #[error("a watch lease already exists for {} (pid {pid})", project.display())]
    LeaseHeld { project: PathBuf, pid: u32 },

    #[error("watch lease error on {}: {message}", path.display())]
    Lease { path: PathBuf, message: String },

    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error(transparent)]
    Backlog(#[from] backlog_common_core::Error),
}

impl WatchError {
    pub(crate) fn lease(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Lease {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Errors caused by the state of the registry or the project directory,
    /// as opposed to failures of the OS or file system.
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            Self::AlreadyWatching { .. }
                | Self::NotWatching { .. }
                | Self::ProjectNotFound { .. }
                | Self::IssuesDirMissing { .. }
                | Self::NotRunning { .. }
                | Self::LeaseHeld { .. }
        )
    }
}
