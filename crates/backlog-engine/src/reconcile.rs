//! The `sync` and `rename` operations over a whole project.

use serde::Serialize;
use tracing::info;

use backlog_common_config::ProjectLayout;
use backlog_common_core::{Epic, Issue, Result};
use backlog_common_log::spans::{project_span, reconcile_span};
use backlog_common_log::timed;

use crate::closure::{self, ClosureReport};
use crate::enforce::{enforce_filenames, EnforcementReport};
use crate::priority::{self, PriorityDiff};
use crate::repository;

/// Filename enforcement over both entity directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameReport {
    pub epics: EnforcementReport,
    pub issues: EnforcementReport,
}

impl RenameReport {
    pub fn renamed(&self) -> usize {
        self.epics.renamed.len() + self.issues.renamed.len()
    }

    pub fn skipped(&self) -> usize {
        self.epics.skipped.len() + self.issues.skipped.len()
    }

    pub fn failed(&self) -> usize {
        self.epics.failed.len() + self.issues.failed.len()
    }
}

/// Everything a `sync` did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Rows in the rewritten priority list.
    pub rows: usize,
    #[serde(flatten)]
    pub priority: PriorityDiff,
    pub closure: ClosureReport,
    /// One entry per enforcement pass, in the order they ran.
    pub renames: Vec<RenameReport>,
}

/// Runs reconciliation for one project.
#[derive(Debug, Clone)]
pub struct Reconciler {
    layout: ProjectLayout,
}

impl Reconciler {
    pub fn new(layout: ProjectLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Full reconciliation.
    ///
    /// Rebuilds the priority list, closes finished epics, and normalizes file
    /// names. When an epic closed, an extra enforcement pass runs right after
    /// closure. The final pass always runs.
    pub fn sync(&self) -> Result<SyncReport> {
        let project = project_span(&self.layout.root);
        let _project = project.enter();

        let (rows, diff) = timed!("priority_sync", self.sync_priority())?;

        let closure = timed!("closure", self.propagate_closure())?;

        let mut renames = Vec::with_capacity(2);
        if closure.changed() {
            info!(closed = closure.closed.len(), "epic status changed, normalizing file names");
            renames.push(self.enforce()?);
        }
        renames.push(self.enforce()?);

        Ok(SyncReport {
            rows,
            priority: diff,
            closure,
            renames,
        })
    }

    /// Filename enforcement over the epic directory, then the issues
    /// directory.
    pub fn rename(&self) -> Result<RenameReport> {
        let project = project_span(&self.layout.root);
        let _project = project.enter();
        self.enforce()
    }

    fn sync_priority(&self) -> Result<(usize, PriorityDiff)> {
        let span = reconcile_span("priority");
        let _enter = span.enter();

        let issues = repository::read_all_issues(&self.layout.issues_dir)?;
        let previous = priority::read_priority_list(&self.layout.priority_file)?;
        let rows = priority::sync_priority(&issues, &previous);
        priority::write_priority_list(&self.layout.priority_file, &rows)?;

        let diff = PriorityDiff::between(&previous, &rows);
        info!(
            rows = rows.len(),
            added = diff.added.len(),
            removed = diff.removed.len(),
            "priority list synchronized"
        );
        Ok((rows.len(), diff))
    }

    fn propagate_closure(&self) -> Result<ClosureReport> {
        let span = reconcile_span("closure");
        let _enter = span.enter();

        let issues: Vec<Issue> = repository::read_all_issues(&self.layout.issues_dir)?;
        let epics = repository::read_entries::<Epic>(&self.layout.epic_dir)?;
        closure::propagate_closure(&issues, &epics, &self.layout.epic_dir)
    }

    fn enforce(&self) -> Result<RenameReport> {
        let span = reconcile_span("rename");
        let _enter = span.enter();

        let report = timed!(
            "rename",
            RenameReport {
                epics: enforce_filenames::<Epic>(&self.layout.epic_dir)?,
                issues: enforce_filenames::<Issue>(&self.layout.issues_dir)?,
            }
        );
        info!(
            renamed = report.renamed(),
            skipped = report.skipped(),
            failed = report.failed(),
            "file names normalized"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backlog_common_core::Status;
    use backlog_test_utils::{row, TempProject};

    #[test]
    fn test_sync_reports_changes() {
        let project = TempProject::new();
        project.write_epic(1, "Login", Status::Open);
        project.write_issue(1, "Fix bug", Status::Close, 1);
        project.write_issue(2, "Add feature", Status::Open, 2);
        project.write_priority(&[row(1, "Fix bug", 1)]);

        let report = Reconciler::new(project.layout().clone()).sync().unwrap();
        assert_eq!(report.rows, 1);
        assert_eq!(report.priority.added, vec![2]);
        assert_eq!(report.priority.removed, vec![1]);
        assert!(report.closure.changed());
        assert_eq!(report.renames.len(), 2);
        assert_eq!(project.epic_files(), vec!["1_C_Login.md"]);
    }

    #[test]
    fn test_sync_without_closure_runs_one_pass() {
        let project = TempProject::new();
        project.write_issue_named("draft.md", 1, "Fix bug", Status::Open, 1);

        let report = Reconciler::new(project.layout().clone()).sync().unwrap();
        assert!(!report.closure.changed());
        assert_eq!(report.renames.len(), 1);
        assert_eq!(report.renames[0].renamed(), 1);
        assert_eq!(project.issue_files(), vec!["1_O_Fix_bug.md"]);
    }

    #[test]
    fn test_sync_missing_project_fails() {
        let project = TempProject::bare();
        assert!(Reconciler::new(project.layout().clone()).sync().is_err());
    }

    #[test]
    fn test_rename_covers_both_directories() {
        let project = TempProject::new();
        project.write_epic_named("e.md", 1, "Login", Status::Open);
        project.write_issue_named("i.md", 1, "Fix bug", Status::Open, 1);

        let report = Reconciler::new(project.layout().clone()).rename().unwrap();
        assert_eq!(report.epics.renamed.len(), 1);
        assert_eq!(report.issues.renamed.len(), 1);
        assert!(project.priority_ids().is_empty());
    }
}
