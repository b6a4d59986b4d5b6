//! Coordinator against a real file system.

use std::sync::Arc;
use std::time::Duration;

use backlog_common_config::ProjectSettings;
use backlog_common_core::Status;
use backlog_test_utils::{canonical_name, TempProject};
use backlog_watch::{EngineExecutor, LeaseStore, WatchCoordinator, WatchError};

fn coordinator() -> WatchCoordinator {
    WatchCoordinator::new(
        Arc::new(EngineExecutor),
        ProjectSettings::default(),
        Duration::from_millis(100),
    )
}

async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_new_issue_is_reconciled() {
    let project = TempProject::new();
    let coordinator = coordinator();
    coordinator.start(project.root()).unwrap();

    // Let the subscription settle before touching the directory.
    tokio::time::sleep(Duration::from_millis(100)).await;
    project.write_issue_named("draft.md", 7, "Add login", Status::Open, 1);

    let expected = canonical_name(7, Status::Open, "Add login");
    let renamed = eventually(|| project.issue_files() == vec![expected.clone()]).await;
    assert!(renamed, "issue files: {:?}", project.issue_files());
    assert!(eventually(|| project.priority_ids() == vec![7]).await);

    assert_eq!(coordinator.shutdown().await.len(), 1);
}

#[tokio::test]
async fn test_missing_issues_dir() {
    let project = TempProject::bare();
    std::fs::create_dir_all(project.root()).unwrap();

    let err = coordinator().start(project.root()).unwrap_err();
    assert!(matches!(err, WatchError::IssuesDirMissing { .. }));
    assert!(err.is_state_error());
}

#[tokio::test]
async fn test_relative_and_absolute_paths_share_an_entry() {
    let project = TempProject::new();
    let coordinator = coordinator();
    let root = coordinator.start(project.root()).unwrap();

    let dotted = project.root().join("issues").join("..");
    let err = coordinator.start(&dotted).unwrap_err();
    assert!(matches!(err, WatchError::AlreadyWatching { path } if path == root));

    coordinator.stop_all();
}

#[tokio::test]
async fn test_unwatch_through_lease() {
    let project = TempProject::new();
    let state = tempfile::TempDir::new().unwrap();
    let leases = LeaseStore::new(state.path());
    let coordinator = coordinator();

    let root = coordinator.start(project.root()).unwrap();
    leases.acquire(&root).unwrap();
    assert!(coordinator.prune_released(&leases).is_empty());

    assert_eq!(leases.release_all().unwrap(), vec![root.clone()]);
    assert_eq!(coordinator.prune_released(&leases), vec![root]);
    assert!(coordinator.is_empty());
}
