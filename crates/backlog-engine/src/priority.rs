//! The priority list: a CSV of the open issues in the order they should be
//! worked on.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use backlog_common_core::{Error, Issue, PriorityRow, Result};
use backlog_common_fs as fs;

/// Column names, in file order.
pub const HEADER: [&str; 4] = ["id", "title", "epic", "estimate"];

/// Read the priority list. A missing file is an empty list.
///
/// Only header names are trimmed. Field values are taken as written, so a
/// padded id is a malformed row.
pub fn read_priority_list(path: &Path) -> Result<Vec<PriorityRow>> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "priority list missing, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::io(path, e)),
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(file);

    let rows = reader
        .deserialize::<PriorityRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Replace the priority list with `rows`. The header is always written.
pub fn write_priority_list(path: &Path, rows: &[PriorityRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::io(path, e.into_error()))?;
    fs::write_atomic(path, &bytes)?;

    debug!(path = %path.display(), rows = rows.len(), "priority list written");
    Ok(())
}

/// Rebuild the priority list for the current issues.
///
/// Rows for issues that are still open keep their relative order, each ID at
/// most once. Open issues without a row are appended in scan order. Rows for
/// closed or vanished issues are dropped. Kept rows are not refreshed from
/// the issue.
pub fn sync_priority(issues: &[Issue], rows: &[PriorityRow]) -> Vec<PriorityRow> {
    let mut pending: HashSet<u32> = issues
        .iter()
        .filter(|i| i.status.is_open())
        .map(|i| i.id)
        .collect();

    let mut synced: Vec<PriorityRow> = rows
        .iter()
        .filter(|row| pending.remove(&row.id))
        .cloned()
        .collect();

    synced.extend(
        issues
            .iter()
            .filter(|i| i.status.is_open() && pending.remove(&i.id))
            .map(PriorityRow::from),
    );

    synced
}

/// IDs that entered or left the list in a sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriorityDiff {
    pub added: Vec<u32>,
    pub removed: Vec<u32>,
}

impl PriorityDiff {
    pub fn between(before: &[PriorityRow], after: &[PriorityRow]) -> Self {
        let before_ids: HashSet<u32> = before.iter().map(|r| r.id).collect();
        let after_ids: HashSet<u32> = after.iter().map(|r| r.id).collect();

        let mut seen = HashSet::new();
        let removed = before
            .iter()
            .map(|r| r.id)
            .filter(|id| !after_ids.contains(id) && seen.insert(*id))
            .collect();
        let added = after
            .iter()
            .map(|r| r.id)
            .filter(|id| !before_ids.contains(id))
            .collect();

        Self { added, removed }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backlog_common_core::Status;
    use backlog_test_utils::{row, temp_dir};
    use proptest::prelude::*;

    fn issue(id: u32, status: Status) -> Issue {
        Issue {
            id,
            title: format!("Issue {id}"),
            status,
            epic: 1,
            estimate: id,
            content: String::new(),
        }
    }

    fn ids(rows: &[PriorityRow]) -> Vec<u32> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_existing_order_preserved_and_new_appended() {
        let issues = [
            issue(1, Status::Open),
            issue(2, Status::Open),
            issue(3, Status::Open),
        ];
        let rows = [row(3, "Issue 3", 1), row(1, "Issue 1", 1)];
        assert_eq!(ids(&sync_priority(&issues, &rows)), vec![3, 1, 2]);
    }

    #[test]
    fn test_closed_and_unknown_rows_dropped() {
        let issues = [issue(1, Status::Open), issue(4, Status::Close)];
        let rows = [row(4, "Issue 4", 1), row(9, "Gone", 1), row(1, "Issue 1", 1)];
        assert_eq!(ids(&sync_priority(&issues, &rows)), vec![1]);
    }

    #[test]
    fn test_duplicate_rows_collapse_to_first() {
        let issues = [issue(1, Status::Open), issue(2, Status::Open)];
        let rows = [row(2, "first", 1), row(1, "Issue 1", 1), row(2, "second", 1)];
        let synced = sync_priority(&issues, &rows);
        assert_eq!(ids(&synced), vec![2, 1]);
        assert_eq!(synced[0].title, "first");
    }

    #[test]
    fn test_kept_rows_are_not_refreshed() {
        let issues = [issue(1, Status::Open)];
        let rows = [row(1, "Old title", 7)];
        assert_eq!(sync_priority(&issues, &rows), rows.to_vec());
    }

    #[test]
    fn test_write_then_read() {
        let dir = temp_dir();
        let path = dir.path().join("order.csv");
        let rows = vec![row(2, "Add feature, fast", 1), row(1, "Fix \"bug\"", 3)];

        write_priority_list(&path, &rows).unwrap();
        assert_eq!(read_priority_list(&path).unwrap(), rows);
    }

    #[test]
    fn test_empty_list_writes_header_only() {
        let dir = temp_dir();
        let path = dir.path().join("order.csv");
        write_priority_list(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "id,title,epic,estimate\n");
        assert!(read_priority_list(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = temp_dir();
        assert!(read_priority_list(&dir.path().join("order.csv")).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_file_is_csv_error() {
        let dir = temp_dir();
        let path = dir.path().join("order.csv");
        std::fs::write(&path, "id,title,epic,estimate\nx,Title,1,1\n").unwrap();
        assert!(matches!(read_priority_list(&path), Err(Error::Csv(_))));
    }

    #[test]
    fn test_read_trims_headers_only() {
        let dir = temp_dir();
        let path = dir.path().join("order.csv");
        std::fs::write(&path, "id, title, epic, estimate\n3,  Padded title ,1,2\n").unwrap();
        assert_eq!(read_priority_list(&path).unwrap(), vec![PriorityRow {
            id: 3,
            title: "  Padded title ".into(),
            epic: 1,
            estimate: 2,
        }]);

        std::fs::write(&path, "id,title,epic,estimate\n 3 ,Padded,1,2\n").unwrap();
        assert!(matches!(read_priority_list(&path), Err(Error::Csv(_))));
    }

    #[test]
    fn test_diff() {
        let before = [row(1, "a", 1), row(4, "d", 1)];
        let after = [row(1, "a", 1), row(2, "b", 1)];
        let diff = PriorityDiff::between(&before, &after);
        assert_eq!(diff.added, vec![2]);
        assert_eq!(diff.removed, vec![4]);
        assert!(PriorityDiff::between(&after, &after).is_empty());
    }

    fn issues_strategy() -> impl Strategy<Value = Vec<Issue>> {
        prop::collection::vec((1u32..30, any::<bool>()), 0..20).prop_map(|specs| {
            let mut seen = HashSet::new();
            specs
                .into_iter()
                .filter(|(id, _)| seen.insert(*id))
                .map(|(id, open)| issue(id, if open { Status::Open } else { Status::Close }))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn test_sync_properties(
            issues in issues_strategy(),
            row_ids in prop::collection::vec(1u32..30, 0..20),
        ) {
            let rows: Vec<PriorityRow> = row_ids.iter().map(|id| row(*id, "r", 1)).collect();
            let synced = sync_priority(&issues, &rows);
            let synced_ids = ids(&synced);

            let open: HashSet<u32> = issues.iter().filter(|i| i.status.is_open()).map(|i| i.id).collect();
            let unique: HashSet<u32> = synced_ids.iter().copied().collect();
            prop_assert_eq!(unique.len(), synced_ids.len());
            prop_assert_eq!(&unique, &open);

            // Idempotent
            prop_assert_eq!(sync_priority(&issues, &synced), synced.clone());

            // Previously tracked rows keep their relative order
            let tracked: Vec<u32> = synced_ids.iter().copied().filter(|id| row_ids.contains(id)).collect();
            let mut expected = Vec::new();
            for id in &row_ids {
                if open.contains(id) && !expected.contains(id) {
                    expected.push(*id);
                }
            }
            prop_assert_eq!(tracked, expected);
        }
    }
}
