//! What a watcher runs when it fires.

use tracing::info;

use backlog_common_config::ProjectLayout;
use backlog_common_core::Result;
use backlog_engine::Reconciler;

/// The two operations a watcher needs from the engine.
#[cfg_attr(test, mockall::automock)]
pub trait ReconcileExecutor: Send + Sync {
    fn run_sync(&self, layout: &ProjectLayout) -> Result<()>;
    fn run_rename(&self, layout: &ProjectLayout) -> Result<()>;
}

/// Runs the real [`Reconciler`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineExecutor;

impl ReconcileExecutor for EngineExecutor {
    fn run_sync(&self, layout: &ProjectLayout) -> Result<()> {
        let report = Reconciler::new(layout.clone()).sync()?;
        info!(
            rows = report.rows,
            added = report.priority.added.len(),
            removed = report.priority.removed.len(),
            epics_closed = report.closure.closed.len(),
            "sync finished"
        );
        Ok(())
    }

    fn run_rename(&self, layout: &ProjectLayout) -> Result<()> {
        let report = Reconciler::new(layout.clone()).rename()?;
        info!(renamed = report.renamed(), "rename finished");
        Ok(())
    }
}
