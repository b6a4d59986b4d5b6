//! Project scaffolding for `init`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use backlog_common_config::ProjectLayout;
use backlog_common_core::{Epic, Issue, PriorityRow, Result, Status};
use backlog_common_fs as fs;

use crate::{priority, repository};

const README: &str = "\
# Backlog

- `epic/` holds one Markdown file per epic.
- `issues/` holds one Markdown file per issue.
- The priority list holds the open issues, most important first.
  Reorder its rows freely; `sync` keeps the order and adds new issues at
  the end.

Each document starts with a YAML header between `---` lines:

```
---
id: 1
title: Fix bug
status: Open
epic: 1
estimate: 3
---
```

File names follow `{id}_{O|C}_{title}.md` and are fixed up by `rename`.
";

/// Paths created by [`scaffold_project`] and paths that were already there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScaffoldReport {
    pub created: Vec<PathBuf>,
    pub existing: Vec<PathBuf>,
}

impl ScaffoldReport {
    fn record(&mut self, path: &Path, created: bool) {
        if created {
            self.created.push(path.to_path_buf());
        } else {
            self.existing.push(path.to_path_buf());
        }
    }
}

/// Create the project layout: both entity directories, a header-only
/// priority list and a README. With `with_samples`, empty directories get a
/// sample epic and issue. Existing files are never overwritten.
pub fn scaffold_project(layout: &ProjectLayout, with_samples: bool) -> Result<ScaffoldReport> {
    let mut report = ScaffoldReport::default();

    for dir in [&layout.root, &layout.epic_dir, &layout.issues_dir] {
        let existed = dir.is_dir();
        fs::ensure_dir(dir)?;
        report.record(dir, !existed);
    }

    let mut rows: Vec<PriorityRow> = Vec::new();
    if with_samples {
        if fs::list_markdown_files(&layout.epic_dir)?.is_empty() {
            let path = repository::write_entity(&layout.epic_dir, &sample_epic())?;
            report.record(&path, true);
        }
        if fs::list_markdown_files(&layout.issues_dir)?.is_empty() {
            let issue = sample_issue();
            let path = repository::write_entity(&layout.issues_dir, &issue)?;
            report.record(&path, true);
            rows.push(PriorityRow::from(&issue));
        }
    }

    if layout.priority_file.exists() {
        report.record(&layout.priority_file, false);
    } else {
        priority::write_priority_list(&layout.priority_file, &rows)?;
        report.record(&layout.priority_file, true);
    }

    let readme = layout.root.join("README.md");
    if readme.exists() {
        report.record(&readme, false);
    } else {
        fs::write_string_atomic(&readme, README)?;
        report.record(&readme, true);
    }

    debug!(existing = report.existing.len(), "existing paths kept");
    info!(root = %layout.root.display(), created = report.created.len(), "project scaffolded");
    Ok(report)
}

fn sample_epic() -> Epic {
    Epic {
        id: 1,
        title: "Getting started".to_string(),
        status: Status::Open,
        content: "Group related issues under an epic. It closes by itself once \
                  every issue that points at it is closed."
            .to_string(),
    }
}

fn sample_issue() -> Issue {
    Issue {
        id: 1,
        title: "Try the sync command".to_string(),
        status: Status::Open,
        epic: 1,
        estimate: 1,
        content: "Change this issue's status to Close and run `sync`.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backlog_test_utils::{file_names, TempProject};

    #[test]
    fn test_scaffold_creates_layout() {
        let project = TempProject::bare();
        let report = scaffold_project(project.layout(), false).unwrap();

        assert!(project.layout().epic_dir.is_dir());
        assert!(project.layout().issues_dir.is_dir());
        assert!(project.priority_ids().is_empty());
        assert!(project.root().join("README.md").exists());
        assert_eq!(report.created.len(), 5);
        assert!(report.existing.is_empty());
    }

    #[test]
    fn test_scaffold_with_samples() {
        let project = TempProject::bare();
        scaffold_project(project.layout(), true).unwrap();

        assert_eq!(project.epic_files(), vec!["1_O_Getting_started.md"]);
        assert_eq!(project.issue_files(), vec!["1_O_Try_the_sync_command.md"]);
        assert_eq!(project.priority_ids(), vec![1]);
    }

    #[test]
    fn test_scaffold_is_idempotent_and_never_overwrites() {
        let project = TempProject::new();
        project.write_issue(7, "Keep me", Status::Open, 1);
        project.write_priority(&[backlog_test_utils::row(7, "Keep me", 1)]);
        let readme = project.root().join("README.md");
        std::fs::write(&readme, "custom").unwrap();

        let report = scaffold_project(project.layout(), true).unwrap();
        assert!(report.existing.contains(&project.layout().priority_file));
        assert_eq!(std::fs::read_to_string(&readme).unwrap(), "custom");
        assert_eq!(project.issue_files(), vec!["7_O_Keep_me.md"]);
        assert_eq!(project.epic_files(), vec!["1_O_Getting_started.md"]);
        assert_eq!(project.priority_ids(), vec![7]);

        let again = scaffold_project(project.layout(), true).unwrap();
        assert!(again.created.is_empty());
        assert_eq!(file_names(project.root()).len(), 4);
    }
}
