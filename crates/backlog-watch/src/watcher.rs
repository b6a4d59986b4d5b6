//! One debounced watch over one project's issues directory.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn, Instrument};

use backlog_common_config::ProjectLayout;

use crate::debounce::Debouncer;
use crate::error::WatchError;
use crate::events::is_relevant;
use crate::executor::ReconcileExecutor;

/// Pending change signals. One queued signal is as good as many.
const CHANNEL_CAPACITY: usize = 64;

/// Watches a project and reconciles it once changes go quiet.
///
/// Must be created inside a tokio runtime. Reconciliation runs on the
/// blocking pool, strictly after the previous one has finished.
pub struct ProjectWatcher {
    layout: ProjectLayout,
    window: Duration,
    debouncer: Arc<Mutex<Debouncer>>,
    subscription: Option<RecommendedWatcher>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ProjectWatcher {
    /// Subscribe to the project's issues directory and start the debounce
    /// loop.
    pub fn start(
        layout: ProjectLayout,
        window: Duration,
        executor: Arc<dyn ReconcileExecutor>,
    ) -> Result<Self, WatchError> {
        if !layout.root.is_dir() {
            return Err(WatchError::ProjectNotFound { path: layout.root });
        }
        if !layout.issues_dir.is_dir() {
            return Err(WatchError::IssuesDirMissing {
                path: layout.issues_dir,
            });
        }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        // The callback runs on notify's thread. A full channel already holds
        // a pending signal, so a failed send loses nothing.
        let mut subscription = notify::recommended_watcher(move |res: notify::Result<Event>| {
            match res {
                Ok(event) if is_relevant(&event) => {
                    let _ = tx.try_send(());
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "file watcher error"),
            }
        })?;
        subscription.watch(&layout.issues_dir, RecursiveMode::NonRecursive)?;

        let mut watcher = Self::from_channel(layout, window, executor, rx);
        watcher.subscription = Some(subscription);
        info!(
            project = %watcher.layout.root.display(),
            debounce_ms = window.as_millis() as u64,
            "watching project"
        );
        Ok(watcher)
    }

    /// Start the debounce loop over an existing change channel instead of a
    /// file system subscription.
    pub fn from_channel(
        layout: ProjectLayout,
        window: Duration,
        executor: Arc<dyn ReconcileExecutor>,
        changes: mpsc::Receiver<()>,
    ) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let debouncer = Arc::new(Mutex::new(Debouncer::new(window)));
        let span = tracing::info_span!("watch", project = %layout.root.display());
        let task = tokio::spawn(
            run(
                layout.clone(),
                Arc::clone(&debouncer),
                executor,
                changes,
                stop_rx,
            )
            .instrument(span),
        );

        Self {
            layout,
            window,
            debouncer,
            subscription: None,
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn root(&self) -> &Path {
        &self.layout.root
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }

    /// Whether a reconciliation is scheduled.
    pub fn is_pending(&self) -> bool {
        self.debouncer.lock().deadline().is_some()
    }

    /// Cancel the subscription and any pending fire. A reconciliation that
    /// is already running completes.
    pub fn stop(&mut self) -> Result<(), WatchError> {
        let Some(stop_tx) = self.stop_tx.take() else {
            return Err(WatchError::NotRunning {
                path: self.layout.root.clone(),
            });
        };
        let _ = stop_tx.send(());
        self.subscription = None;
        self.debouncer.lock().reset();
        info!(project = %self.layout.root.display(), "stopped watching project");
        Ok(())
    }

    /// Wait for the debounce loop to exit.
    pub async fn finished(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                error!(error = %err, "watch task failed");
            }
        }
    }
}

impl Drop for ProjectWatcher {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}

async fn run(
    layout: ProjectLayout,
    debouncer: Arc<Mutex<Debouncer>>,
    executor: Arc<dyn ReconcileExecutor>,
    mut changes: mpsc::Receiver<()>,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        let deadline = debouncer.lock().deadline();
        tokio::select! {
            _ = &mut stop => break,
            change = changes.recv() => match change {
                Some(()) => {
                    debug!("change detected");
                    debouncer.lock().on_change(Instant::now());
                }
                None => break,
            },
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                let fire = debouncer.lock().on_timer(Instant::now());
                if fire {
                    reconcile(&layout, &executor).await;
                }
            }
        }
    }

    debouncer.lock().reset();
    debug!("watch loop exited");
}

/// Sync, then rename. Failures are logged and the watch carries on.
async fn reconcile(layout: &ProjectLayout, executor: &Arc<dyn ReconcileExecutor>) {
    let layout = layout.clone();
    let executor = Arc::clone(executor);

    let result = tokio::task::spawn_blocking(move || {
        info!("reconciling after changes");
        if let Err(err) = executor.run_sync(&layout) {
            warn!(error = %err, "sync failed");
        }
        if let Err(err) = executor.run_rename(&layout) {
            warn!(error = %err, "rename failed");
        }
    })
    .await;

    if let Err(err) = result {
        error!(error = %err, "reconciliation task failed");
    }
}
