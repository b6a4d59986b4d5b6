//! Debounce behavior of a project watcher under a paused clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

use backlog_common_config::ProjectLayout;
use backlog_common_core::Result;
use backlog_watch::{ProjectWatcher, ReconcileExecutor};

#[derive(Default)]
struct Counting {
    syncs: AtomicUsize,
    renames: AtomicUsize,
}

impl Counting {
    fn syncs(&self) -> usize {
        self.syncs.load(Ordering::SeqCst)
    }

    fn renames(&self) -> usize {
        self.renames.load(Ordering::SeqCst)
    }
}

impl ReconcileExecutor for Counting {
    fn run_sync(&self, _layout: &ProjectLayout) -> Result<()> {
        self.syncs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn run_rename(&self, _layout: &ProjectLayout) -> Result<()> {
        self.renames.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn watch(window_ms: u64) -> (Arc<Counting>, mpsc::Sender<()>, ProjectWatcher) {
    let counting = Arc::new(Counting::default());
    let (tx, rx) = mpsc::channel(16);
    let watcher = ProjectWatcher::from_channel(
        ProjectLayout::with_defaults("/work/projects"),
        Duration::from_millis(window_ms),
        counting.clone(),
        rx,
    );
    (counting, tx, watcher)
}

async fn wait_for_syncs(counting: &Counting, expected: usize) {
    for _ in 0..100 {
        if counting.syncs() >= expected {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_burst_triggers_single_reconciliation() {
    let (counting, tx, mut watcher) = watch(500);

    tx.send(()).await.unwrap();
    sleep(Duration::from_millis(100)).await;
    tx.send(()).await.unwrap();

    // The first change alone would have fired at t=500.
    sleep(Duration::from_millis(499)).await;
    assert_eq!(counting.syncs(), 0);

    wait_for_syncs(&counting, 1).await;
    assert_eq!(counting.syncs(), 1);
    assert_eq!(counting.renames(), 1);

    sleep(Duration::from_secs(2)).await;
    assert_eq!(counting.syncs(), 1);

    watcher.stop().unwrap();
    watcher.finished().await;
}

#[tokio::test(start_paused = true)]
async fn test_separate_bursts_reconcile_separately() {
    let (counting, tx, mut watcher) = watch(200);

    tx.send(()).await.unwrap();
    wait_for_syncs(&counting, 1).await;
    assert_eq!(counting.syncs(), 1);

    sleep(Duration::from_secs(1)).await;
    tx.send(()).await.unwrap();
    tx.send(()).await.unwrap();
    wait_for_syncs(&counting, 2).await;

    sleep(Duration::from_secs(1)).await;
    assert_eq!(counting.syncs(), 2);
    assert_eq!(counting.renames(), 2);

    watcher.stop().unwrap();
    watcher.finished().await;
}

#[tokio::test(start_paused = true)]
async fn test_no_changes_no_reconciliation() {
    let (counting, _tx, mut watcher) = watch(100);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(counting.syncs(), 0);

    watcher.stop().unwrap();
    watcher.finished().await;
}

#[tokio::test(start_paused = true)]
async fn test_closed_channel_ends_watch() {
    let (counting, tx, mut watcher) = watch(100);
    drop(tx);

    watcher.finished().await;
    assert_eq!(counting.syncs(), 0);
}
