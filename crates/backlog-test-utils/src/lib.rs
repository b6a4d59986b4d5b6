//! Test utilities for instant-backlog crates.
//!
//! Documents are written by hand here rather than through the engine so
//! tests exercise the on-disk format independently of the codec under test.

use std::path::{Path, PathBuf};

use backlog_common_config::ProjectLayout;
use backlog_common_core::{PriorityRow, Status};
use tempfile::TempDir;

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Filename the engine is expected to give an entity with a plain title.
pub fn canonical_name(id: u32, status: Status, title: &str) -> String {
    format!("{id}_{}_{}.md", status.code(), title.replace(' ', "_"))
}

/// Issue document text.
pub fn issue_doc(id: u32, title: &str, status: Status, epic: u32, estimate: u32, body: &str) -> String {
    format!(
        "---\nid: {id}\ntitle: {}\nstatus: {status}\nepic: {epic}\nestimate: {estimate}\n---\n\n{body}\n",
        quote(title)
    )
}

/// Epic document text.
pub fn epic_doc(id: u32, title: &str, status: Status, body: &str) -> String {
    format!(
        "---\nid: {id}\ntitle: {}\nstatus: {status}\n---\n\n{body}\n",
        quote(title)
    )
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// A scaffolded project in a temporary directory.
pub struct TempProject {
    dir: TempDir,
    layout: ProjectLayout,
}

impl TempProject {
    /// Project root at `<tmp>/projects` with empty `epic/` and `issues/`
    /// and a header-only priority file.
    pub fn new() -> Self {
        let project = Self::bare();
        std::fs::create_dir_all(&project.layout.epic_dir).expect("Failed to create epic dir");
        std::fs::create_dir_all(&project.layout.issues_dir).expect("Failed to create issues dir");
        project.write_priority(&[]);
        project
    }

    /// Project root that does not exist yet.
    pub fn bare() -> Self {
        let dir = temp_dir();
        let layout = ProjectLayout::with_defaults(dir.path().join("projects"));
        Self { dir, layout }
    }

    /// Working directory containing the project root.
    pub fn workdir(&self) -> &Path {
        self.dir.path()
    }

    pub fn root(&self) -> &Path {
        &self.layout.root
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Write an issue under its canonical name.
    pub fn write_issue(&self, id: u32, title: &str, status: Status, epic: u32) -> PathBuf {
        self.write_issue_named(&canonical_name(id, status, title), id, title, status, epic)
    }

    /// Write an issue under an arbitrary file name.
    pub fn write_issue_named(
        &self,
        name: &str,
        id: u32,
        title: &str,
        status: Status,
        epic: u32,
    ) -> PathBuf {
        let doc = issue_doc(id, title, status, epic, 1, &format!("Issue {id} details."));
        self.write_raw(&self.layout.issues_dir, name, &doc)
    }

    /// Write an epic under its canonical name.
    pub fn write_epic(&self, id: u32, title: &str, status: Status) -> PathBuf {
        self.write_epic_named(&canonical_name(id, status, title), id, title, status)
    }

    /// Write an epic under an arbitrary file name.
    pub fn write_epic_named(&self, name: &str, id: u32, title: &str, status: Status) -> PathBuf {
        let doc = epic_doc(id, title, status, &format!("Epic {id} goals."));
        self.write_raw(&self.layout.epic_dir, name, &doc)
    }

    /// Write arbitrary text into `dir`.
    pub fn write_raw(&self, dir: &Path, name: &str, contents: &str) -> PathBuf {
        std::fs::create_dir_all(dir).expect("Failed to create dir");
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("Failed to write file");
        path
    }

    /// Replace the priority file with the given rows.
    pub fn write_priority(&self, rows: &[PriorityRow]) {
        let mut writer =
            csv::Writer::from_path(&self.layout.priority_file).expect("Failed to open priority file");
        writer
            .write_record(["id", "title", "epic", "estimate"])
            .expect("Failed to write header");
        for row in rows {
            writer
                .write_record([
                    row.id.to_string(),
                    row.title.clone(),
                    row.epic.to_string(),
                    row.estimate.to_string(),
                ])
                .expect("Failed to write row");
        }
        writer.flush().expect("Failed to flush priority file");
    }

    /// IDs in the priority file, in file order.
    pub fn priority_ids(&self) -> Vec<u32> {
        let mut reader =
            csv::Reader::from_path(&self.layout.priority_file).expect("Failed to open priority file");
        reader
            .records()
            .map(|r| {
                let record = r.expect("Failed to read priority row");
                record[0].parse().expect("Priority id is not an integer")
            })
            .collect()
    }

    /// Sorted file names in the issues directory.
    pub fn issue_files(&self) -> Vec<String> {
        file_names(&self.layout.issues_dir)
    }

    /// Sorted file names in the epic directory.
    pub fn epic_files(&self) -> Vec<String> {
        file_names(&self.layout.epic_dir)
    }
}

impl Default for TempProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorted names of the entries in `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|e| {
            e.expect("Failed to read entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// Priority row shorthand.
pub fn row(id: u32, title: &str, epic: u32) -> PriorityRow {
    PriorityRow {
        id,
        title: title.to_string(),
        epic,
        estimate: 1,
    }
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_layout() {
        let project = TempProject::new();
        assert!(project.layout().epic_dir.is_dir());
        assert!(project.layout().issues_dir.is_dir());
        assert!(project.priority_ids().is_empty());
        assert!(project.root().starts_with(project.workdir()));
    }

    #[test]
    fn test_write_issue_uses_canonical_name() {
        let project = TempProject::new();
        project.write_issue(1, "Fix bug", Status::Open, 1);
        assert_eq!(project.issue_files(), vec!["1_O_Fix_bug.md"]);
    }

    #[test]
    fn test_priority_file_roundtrip() {
        let project = TempProject::new();
        project.write_priority(&[row(2, "Add feature", 1), row(1, "Fix bug", 1)]);
        assert_eq!(project.priority_ids(), vec![2, 1]);
    }

    #[test]
    fn test_assert_macros() {
        let ok: Result<u32, String> = Ok(3);
        assert_eq!(assert_ok!(ok), 3);
        let err: Result<u32, String> = Err("nope".into());
        assert_eq!(assert_err!(err), "nope");
    }
}
