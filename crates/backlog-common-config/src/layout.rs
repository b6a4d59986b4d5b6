//! Resolved project layout.

use std::path::{Path, PathBuf};

use crate::types::ProjectSettings;

/// Absolute or working-directory-relative paths of one backlog project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub epic_dir: PathBuf,
    pub issues_dir: PathBuf,
    pub priority_file: PathBuf,
}

impl ProjectLayout {
    /// Resolve the layout of the project rooted at `root`.
    pub fn new(root: impl AsRef<Path>, settings: &ProjectSettings) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            epic_dir: root.join(&settings.epic_dir),
            issues_dir: root.join(&settings.issues_dir),
            priority_file: root.join(&settings.priority_file),
            root,
        }
    }

    /// Layout with the default directory names.
    pub fn with_defaults(root: impl AsRef<Path>) -> Self {
        Self::new(root, &ProjectSettings::default())
    }
}
