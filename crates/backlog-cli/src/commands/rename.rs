//! Rename command implementation.

use clap::Parser;

use backlog_engine::Reconciler;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, RenameOutput};

/// Rename documents to match their headers
#[derive(Debug, Parser)]
pub struct RenameCommand {}

impl RenameCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let layout = ctx.existing_layout()?;
        ctx.narrate(format!("Renaming files in {}", layout.root.display()));

        let report = Reconciler::new(layout.clone()).rename()?;

        print_output(
            ctx,
            &RenameOutput {
                project: layout.root,
                report,
            },
        )
    }
}
