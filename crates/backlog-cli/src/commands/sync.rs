//! Sync command implementation.

use clap::Parser;

use backlog_engine::Reconciler;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, SyncOutput};

/// Rebuild the priority list, close finished epics and fix file names
#[derive(Debug, Parser)]
pub struct SyncCommand {}

impl SyncCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let layout = ctx.existing_layout()?;
        ctx.narrate(format!("Syncing {}", layout.root.display()));

        let report = Reconciler::new(layout.clone()).sync()?;

        print_output(
            ctx,
            &SyncOutput {
                project: layout.root,
                report,
            },
        )
    }
}
