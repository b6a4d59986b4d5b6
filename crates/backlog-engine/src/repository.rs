//! Reading and writing entity documents.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use backlog_common_core::{Entity, Epic, Issue, Result};
use backlog_common_fs as fs;

use crate::{document, filename};

/// An entity together with the file it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntity<E> {
    pub path: PathBuf,
    pub entity: E,
}

/// Parse one document from disk.
pub fn read_entity<E: Entity>(path: &Path) -> Result<E> {
    let text = fs::read_to_string(path)?;
    document::parse_entity(&text).map_err(|e| e.in_file(path))
}

/// Every readable document of kind `E` directly inside `dir`, in scan order,
/// with the path each came from.
///
/// A file that cannot be read or parsed is logged and skipped. Failing to
/// list the directory itself is an error.
pub fn read_entries<E: Entity>(dir: &Path) -> Result<Vec<StoredEntity<E>>> {
    let files = fs::list_markdown_files(dir)?;

    let mut entries = Vec::with_capacity(files.len());
    for path in files {
        match read_entity::<E>(&path) {
            Ok(entity) => entries.push(StoredEntity { path, entity }),
            Err(err) => {
                warn!(kind = %E::KIND, path = %path.display(), error = %err, "skipping unreadable document");
            }
        }
    }

    debug!(kind = %E::KIND, dir = %dir.display(), count = entries.len(), "documents loaded");
    Ok(entries)
}

/// Every readable document of kind `E` directly inside `dir`, in scan order.
pub fn read_all<E: Entity>(dir: &Path) -> Result<Vec<E>> {
    Ok(read_entries(dir)?.into_iter().map(|e| e.entity).collect())
}

/// All issues in `dir`, one per ID.
///
/// When several files carry the same ID a closed one beats an open one, and
/// between equal statuses the one scanned last wins. The surviving issue
/// keeps the position where its ID was first seen.
pub fn read_all_issues(dir: &Path) -> Result<Vec<Issue>> {
    Ok(dedup_issues(read_all(dir)?))
}

/// All epics in `dir`. Epics are not deduplicated.
pub fn read_all_epics(dir: &Path) -> Result<Vec<Epic>> {
    read_all(dir)
}

fn dedup_issues(issues: Vec<Issue>) -> Vec<Issue> {
    let mut kept: Vec<Issue> = Vec::with_capacity(issues.len());
    let mut slots: HashMap<u32, usize> = HashMap::new();

    for issue in issues {
        match slots.get(&issue.id) {
            Some(&slot) => {
                let current = &kept[slot];
                warn!(
                    id = issue.id,
                    kept_status = %current.status,
                    other_status = %issue.status,
                    "multiple files for the same issue"
                );
                if issue.status.is_closed() || current.status == issue.status {
                    kept[slot] = issue;
                }
            }
            None => {
                slots.insert(issue.id, kept.len());
                kept.push(issue);
            }
        }
    }

    kept
}

/// Write an entity under its canonical name in `dir`, replacing any file
/// already there. Other files for the same ID are left alone.
pub fn write_entity<E: Entity>(dir: &Path, entity: &E) -> Result<PathBuf> {
    let path = dir.join(filename::canonical_name(entity));
    let text = document::render_entity(entity)?;
    fs::write_string_atomic(&path, &text)?;
    debug!(kind = %E::KIND, id = entity.id(), path = %path.display(), "document written");
    Ok(path)
}

/// What happened to the previous file in a [`replace_entity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "result", content = "error")]
pub enum Cleanup {
    /// The entity kept its file name.
    NotNeeded,
    /// The previous file was deleted.
    Removed,
    /// The previous file was already gone.
    AlreadyGone,
    /// The primary write failed, so the previous file was left in place.
    Skipped,
    /// Deleting the previous file failed. The stale file stays until the
    /// next filename enforcement pass.
    Failed(String),
}

impl Cleanup {
    pub fn is_ok(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Result of writing an entity under a new name and removing the old file.
#[derive(Debug)]
pub struct ReplaceOutcome {
    pub new_path: PathBuf,
    pub old_path: PathBuf,
    pub primary: Result<()>,
    pub cleanup: Cleanup,
}

impl ReplaceOutcome {
    pub fn primary_write_ok(&self) -> bool {
        self.primary.is_ok()
    }

    pub fn cleanup_ok(&self) -> bool {
        self.cleanup.is_ok()
    }
}

/// Write `entity` under its canonical name, then delete `previous` if it is
/// a different file.
///
/// The two phases report separately. A failed write skips the cleanup. A
/// failed cleanup is only logged.
pub fn replace_entity<E: Entity>(dir: &Path, entity: &E, previous: &Path) -> ReplaceOutcome {
    let new_path = dir.join(filename::canonical_name(entity));
    let old_path = previous.to_path_buf();

    let primary = document::render_entity(entity)
        .and_then(|text| fs::write_string_atomic(&new_path, &text));

    let cleanup = if primary.is_err() {
        Cleanup::Skipped
    } else if old_path == new_path {
        Cleanup::NotNeeded
    } else {
        match fs::remove_file_if_exists(&old_path) {
            Ok(true) => Cleanup::Removed,
            Ok(false) => Cleanup::AlreadyGone,
            Err(err) => {
                warn!(path = %old_path.display(), error = %err, "failed to remove previous file");
                Cleanup::Failed(err.to_string())
            }
        }
    };

    ReplaceOutcome {
        new_path,
        old_path,
        primary,
        cleanup,
    }
}
