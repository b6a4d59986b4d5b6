//! CLI argument definitions using clap derive macros.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use backlog_common_config::{BacklogConfig, ConfigLoader, ProjectLayout};
use backlog_watch::LeaseStore;

use crate::commands::{InitCommand, RenameCommand, SyncCommand, UnwatchCommand, WatchCommand};
use crate::error::CliError;

/// Keep a Markdown backlog consistent with its priority list
///
/// Issues and epics are Markdown files with a YAML header. `sync` rebuilds
/// the priority list and closes finished epics, `rename` fixes file names,
/// and `watch` does both whenever the issues change.
#[derive(Debug, Parser)]
#[command(
    name = "instant-backlog",
    author,
    version,
    about,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "BACKLOG_CONFIG",
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// Project directory (default: `project.root` from the configuration)
    #[arg(short, long, global = true, value_hint = ValueHint::DirPath)]
    pub project: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the project layout
    #[command(visible_alias = "new")]
    Init(InitCommand),

    /// Rebuild the priority list, close finished epics and fix file names
    Sync(SyncCommand),

    /// Rename documents to match their headers
    Rename(RenameCommand),

    /// Reconcile projects whenever their issues change
    Watch(WatchCommand),

    /// Stop watching a project, or every project
    Unwatch(UnwatchCommand),
}

impl Cli {
    /// Load configuration from the given file or `.backlog/config.yaml`.
    pub fn load_config(&self) -> Result<BacklogConfig, CliError> {
        let loader = ConfigLoader::new(".");
        let config = match &self.config {
            Some(path) => loader.load_file(path)?,
            None => loader.load()?,
        };
        Ok(config)
    }

    /// Execute the selected command
    pub async fn execute(self) -> Result<(), CliError> {
        let config = self.load_config()?;
        let ctx = CommandContext {
            config,
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            project: self.project,
        };

        match self.command {
            Command::Init(cmd) => cmd.execute(&ctx),
            Command::Sync(cmd) => cmd.execute(&ctx),
            Command::Rename(cmd) => cmd.execute(&ctx),
            Command::Watch(cmd) => cmd.execute(&ctx).await,
            Command::Unwatch(cmd) => cmd.execute(&ctx),
        }
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: BacklogConfig,
    pub format: OutputFormat,
    pub quiet: bool,
    pub verbose: u8,
    /// `--project`, if given.
    pub project: Option<PathBuf>,
}

impl CommandContext {
    /// The project `--project` names, or the configured one.
    pub fn project_root(&self) -> PathBuf {
        self.project
            .clone()
            .unwrap_or_else(|| self.config.project.root.clone())
    }

    pub fn layout_for(&self, root: impl AsRef<Path>) -> ProjectLayout {
        ProjectLayout::new(root, &self.config.project)
    }

    /// Layout of the selected project, which must exist.
    pub fn existing_layout(&self) -> Result<ProjectLayout, CliError> {
        let root = self.project_root();
        if !root.is_dir() {
            return Err(CliError::user_with_hint(
                format!("project directory not found: {}", root.display()),
                "Run `instant-backlog init` first, or pass --project",
            ));
        }
        Ok(self.layout_for(root))
    }

    pub fn lease_store(&self) -> LeaseStore {
        LeaseStore::new(self.config.watch.lease_dir())
    }

    /// Print a progress line. Only text output narrates.
    pub fn narrate(&self, line: impl AsRef<str>) {
        if self.format == OutputFormat::Text && !self.quiet {
            println!("{}", line.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "instant-backlog",
            "sync",
            "--project",
            "backlog",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Sync(_)));
        assert_eq!(cli.project, Some(PathBuf::from("backlog")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["instant-backlog", "-q", "-v", "sync"]).is_err());
    }

    #[test]
    fn test_project_root_prefers_flag() {
        let mut ctx = CommandContext {
            config: BacklogConfig::default(),
            format: OutputFormat::Text,
            quiet: false,
            verbose: 0,
            project: None,
        };
        assert_eq!(ctx.project_root(), PathBuf::from("projects"));

        ctx.project = Some(PathBuf::from("/tmp/backlog"));
        assert_eq!(ctx.project_root(), PathBuf::from("/tmp/backlog"));
        assert_eq!(
            ctx.layout_for(ctx.project_root()).issues_dir,
            PathBuf::from("/tmp/backlog/issues")
        );
    }
}
