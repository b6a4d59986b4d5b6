//! Epic closure: an open epic whose issues are all closed becomes closed.
//!
//! Closure is one way. An epic that is already closed is never reopened and
//! an epic with no issues is never touched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use backlog_common_core::{Epic, Issue, Result, Status};

use crate::repository::{self, Cleanup, StoredEntity};

/// One epic flipped to closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpicClosure {
    pub id: u32,
    pub title: String,
    pub old_path: PathBuf,
    pub new_path: PathBuf,
    pub cleanup: Cleanup,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClosureReport {
    pub closed: Vec<EpicClosure>,
}

impl ClosureReport {
    /// Did any epic change status?
    pub fn changed(&self) -> bool {
        !self.closed.is_empty()
    }
}

/// IDs of the open epics that have at least one issue and no open ones.
pub fn epics_ready_to_close<'a>(
    issues: &[Issue],
    epics: impl IntoIterator<Item = &'a Epic>,
) -> Vec<u32> {
    let mut by_epic: HashMap<u32, (usize, bool)> = HashMap::new();
    for issue in issues {
        let entry = by_epic.entry(issue.epic).or_insert((0, true));
        entry.0 += 1;
        entry.1 &= issue.status.is_closed();
    }

    epics
        .into_iter()
        .filter(|epic| epic.status.is_open())
        .filter(|epic| matches!(by_epic.get(&epic.id), Some(&(count, all_closed)) if count > 0 && all_closed))
        .map(|epic| epic.id)
        .collect()
}

/// Close every epic in `epics` whose issues are all closed.
///
/// Each one is rewritten under its closed name in `epic_dir` and the file it
/// was read from is removed. A failed write aborts. A failed removal is
/// recorded in the report and left for the next filename pass.
pub fn propagate_closure(
    issues: &[Issue],
    epics: &[StoredEntity<Epic>],
    epic_dir: &Path,
) -> Result<ClosureReport> {
    let ready = epics_ready_to_close(issues, epics.iter().map(|e| &e.entity));

    let mut report = ClosureReport::default();
    for stored in epics.iter().filter(|e| ready.contains(&e.entity.id)) {
        let mut epic = stored.entity.clone();
        epic.status = Status::Close;

        let outcome = repository::replace_entity(epic_dir, &epic, &stored.path);
        outcome.primary?;

        info!(
            epic = epic.id,
            title = %epic.title,
            from = %Status::Open,
            to = %Status::Close,
            "epic closed: all issues closed"
        );

        report.closed.push(EpicClosure {
            id: epic.id,
            title: epic.title,
            old_path: outcome.old_path,
            new_path: outcome.new_path,
            cleanup: outcome.cleanup,
        });
    }

    Ok(report)
}
