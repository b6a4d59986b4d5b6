//! Filename enforcement: rename every document whose name disagrees with
//! its header.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use backlog_common_core::{Entity, Result};
use backlog_common_fs as fs;
use backlog_common_log::spans::file_span;

use crate::{filename, repository};

/// A rename performed by the pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRename {
    pub from: PathBuf,
    pub to: PathBuf,
    /// A different file already sat at `to` and was removed first.
    pub replaced: bool,
}

/// Outcome of one pass over one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnforcementReport {
    pub renamed: Vec<FileRename>,
    /// Files that could not be parsed.
    pub skipped: Vec<PathBuf>,
    /// Files whose rename failed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl EnforcementReport {
    pub fn is_clean(&self) -> bool {
        self.renamed.is_empty() && self.failed.is_empty()
    }
}

/// Bring every `E` document in `dir` to its canonical name.
///
/// Unparseable files are skipped with a warning. When the canonical name is
/// already taken the existing file is treated as stale and removed first.
/// Rename failures are logged and the pass moves on.
pub fn enforce_filenames<E: Entity>(dir: &Path) -> Result<EnforcementReport> {
    let files = fs::list_markdown_files(dir)?;
    let mut report = EnforcementReport::default();

    for path in files {
        // Removed earlier in this pass as a conflicting destination.
        if !path.exists() {
            debug!(path = %path.display(), "file vanished during pass");
            continue;
        }

        let entity = match repository::read_entity::<E>(&path) {
            Ok(entity) => entity,
            Err(err) => {
                warn!(kind = %E::KIND, path = %path.display(), error = %err, "skipping unparseable document");
                report.skipped.push(path);
                continue;
            }
        };

        let canonical = filename::canonical_name(&entity);
        if fs::file_name(&path) == canonical {
            continue;
        }

        let target = dir.join(&canonical);
        let span = file_span("rename", &path);
        let _enter = span.enter();

        let mut replaced = false;
        if target.exists() {
            warn!(target = %target.display(), "conflicting destination replaced");
            match fs::remove_file_if_exists(&target) {
                Ok(removed) => replaced = removed,
                Err(err) => {
                    warn!(error = %err, "failed to remove conflicting destination");
                    report.failed.push((path, err.to_string()));
                    continue;
                }
            }
        }

        match fs::rename(&path, &target) {
            Ok(()) => {
                info!(from = %fs::file_name(&path), to = %canonical, "renamed");
                report.renamed.push(FileRename {
                    from: path,
                    to: target,
                    replaced,
                });
            }
            Err(err) => {
                warn!(error = %err, "rename failed");
                report.failed.push((path, err.to_string()));
            }
        }
    }

    Ok(report)
}
