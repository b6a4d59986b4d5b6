//! Unwatch command implementation.

use std::path::PathBuf;

use clap::Parser;

use backlog_common_fs::path::absolutize;
use backlog_watch::WatchError;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, UnwatchOutput};

/// Stop watching a project, or every project
///
/// The running `watch` process notices within one lease poll interval.
#[derive(Debug, Parser)]
pub struct UnwatchCommand {
    /// Project to stop watching (default: all)
    pub path: Option<PathBuf>,
}

impl UnwatchCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let leases = ctx.lease_store();

        let released = match &self.path {
            Some(path) => {
                let root = absolutize(path)?;
                if !leases.release(&root)? {
                    return Err(WatchError::NotWatching { path: root }.into());
                }
                vec![root]
            }
            None => leases.release_all()?,
        };

        print_output(ctx, &UnwatchOutput { released })
    }
}
