//! Init command implementation.

use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use backlog_engine::scaffold_project;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, InitOutput};

/// Create the project layout
#[derive(Debug, Parser)]
pub struct InitCommand {
    /// Directory to create the project in (default: current directory).
    /// Ignored when --project is given.
    pub path: Option<PathBuf>,

    /// Add a sample epic and issue
    #[arg(long)]
    pub samples: bool,
}

impl InitCommand {
    /// The project root: `--project` as is, otherwise the configured root
    /// under PATH.
    fn project_root(&self, ctx: &CommandContext) -> PathBuf {
        if let Some(project) = &ctx.project {
            return project.clone();
        }
        match &self.path {
            Some(base) => base.join(&ctx.config.project.root),
            None => ctx.config.project.root.clone(),
        }
    }

    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let root = self.project_root(ctx);
        debug!(root = %root.display(), samples = self.samples, "initializing project");

        let layout = ctx.layout_for(&root);
        let report = scaffold_project(&layout, self.samples)?;

        print_output(ctx, &InitOutput { project: root, report })
    }
}
