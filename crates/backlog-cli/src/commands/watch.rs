//! Watch command implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use backlog_watch::{EngineExecutor, LeaseStore, WatchCoordinator};

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, ShutdownReason, WatchOutput};

/// Reconcile projects whenever their issues change
///
/// Runs until interrupted or until every watched project has been released
/// with `unwatch`.
#[derive(Debug, Parser)]
pub struct WatchCommand {
    /// Projects to watch (default: the selected project)
    pub paths: Vec<PathBuf>,
}

impl WatchCommand {
    fn targets(&self, ctx: &CommandContext) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![ctx.project_root()]
        } else {
            self.paths.clone()
        }
    }

    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let leases = ctx.lease_store();
        let coordinator = WatchCoordinator::new(
            Arc::new(EngineExecutor),
            ctx.config.project.clone(),
            ctx.config.watch.debounce(),
        );

        let mut held = Vec::new();
        for target in self.targets(ctx) {
            match start_one(&coordinator, &leases, &target) {
                Ok(root) => {
                    ctx.narrate(format!("Watching {}", root.display()));
                    held.push(root);
                }
                Err(err) => {
                    coordinator.shutdown().await;
                    release(&leases, &held);
                    return Err(err);
                }
            }
        }
        ctx.narrate("Press Ctrl+C to stop, or run `instant-backlog unwatch` from another terminal");

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);
        let mut poll = tokio::time::interval(ctx.config.watch.lease_poll());
        let mut released = Vec::new();

        let outcome = loop {
            tokio::select! {
                result = &mut shutdown => {
                    info!("shutdown signal received");
                    break result.map(|()| ShutdownReason::Signal);
                }
                _ = poll.tick() => {
                    for root in coordinator.prune_released(&leases) {
                        ctx.narrate(format!("Unwatched {}", root.display()));
                        released.push(root);
                    }
                    if coordinator.is_empty() {
                        break Ok(ShutdownReason::AllReleased);
                    }
                }
            }
        };

        // Leases are released even when signal handling failed.
        let stopped = coordinator.shutdown().await;
        release(&leases, &held);
        let reason = outcome?;

        print_output(
            ctx,
            &WatchOutput {
                stopped,
                released,
                reason,
            },
        )
    }
}

/// Start one watcher and take its lease. On a lease failure the watcher is
/// stopped again.
fn start_one(
    coordinator: &WatchCoordinator,
    leases: &LeaseStore,
    target: &Path,
) -> Result<PathBuf, CliError> {
    let root = coordinator.start(target)?;
    if let Err(err) = leases.acquire(&root) {
        if let Err(stop_err) = coordinator.stop(&root) {
            warn!(project = %root.display(), error = %stop_err, "failed to stop watcher");
        }
        return Err(err.into());
    }
    Ok(root)
}

/// Release our leases. Ones already removed by `unwatch` are skipped.
fn release(leases: &LeaseStore, held: &[PathBuf]) {
    for root in held {
        if let Err(err) = leases.release(root) {
            warn!(project = %root.display(), error = %err, "failed to release watch lease");
        }
    }
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() -> Result<(), CliError> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate())
            .map_err(|e| CliError::io("failed to install SIGTERM handler", e))?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.map_err(|e| CliError::io("failed to listen for Ctrl+C", e))?;
            }
            _ = terminate.recv() => {}
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| CliError::io("failed to listen for Ctrl+C", e))
    }
}
