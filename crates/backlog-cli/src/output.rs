//! Output formatting utilities for CLI commands.

use std::fmt::{self, Write as _};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use serde::Serialize;

use backlog_common_fs::file_name;
use backlog_engine::{Cleanup, EnforcementReport, RenameReport, ScaffoldReport, SyncReport};

use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;

/// Trait for types that can be formatted for output
pub trait FormattedOutput {
    fn format_text(&self) -> Result<String, fmt::Error>;

    fn format_json(&self) -> Result<String, serde_json::Error>
    where
        Self: Serialize,
    {
        serde_json::to_string_pretty(self)
    }
}

/// Print the final report of a command to stdout
pub fn print_output<T>(ctx: &CommandContext, value: &T) -> Result<(), CliError>
where
    T: FormattedOutput + Serialize,
{
    write_output(ctx, value, io::stdout().lock())
}

/// Print the final report of a command to a writer
pub fn write_output<T, W>(ctx: &CommandContext, value: &T, mut writer: W) -> Result<(), CliError>
where
    T: FormattedOutput + Serialize,
    W: io::Write,
{
    let output = match ctx.format {
        OutputFormat::Text if ctx.quiet => return Ok(()),
        OutputFormat::Text => value.format_text().map_err(|e| {
            CliError::Other(anyhow::anyhow!("text formatting failed: {e}"))
        })?,
        OutputFormat::Json => value.format_json()?,
    };

    writeln!(writer, "{}", output.trim_end())
        .map_err(|e| CliError::io("failed to write output", e))?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub project: PathBuf,
    #[serde(flatten)]
    pub report: ScaffoldReport,
}

impl FormattedOutput for InitOutput {
    fn format_text(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        for path in &self.report.created {
            writeln!(out, "  created  {}", path.display())?;
        }
        for path in &self.report.existing {
            writeln!(out, "  exists   {}", path.display())?;
        }
        writeln!(out, "✓ Backlog project ready in {}", self.project.display())?;
        Ok(out)
    }
}

#[derive(Debug, Serialize)]
pub struct SyncOutput {
    pub project: PathBuf,
    #[serde(flatten)]
    pub report: SyncReport,
}

impl FormattedOutput for SyncOutput {
    fn format_text(&self) -> Result<String, fmt::Error> {
        let report = &self.report;
        let mut out = String::new();

        writeln!(
            out,
            "Priority list: {} open issues ({} added, {} removed)",
            report.rows,
            report.priority.added.len(),
            report.priority.removed.len()
        )?;

        for closed in &report.closure.closed {
            writeln!(out, "Epic {} \"{}\" closed: all of its issues are closed", closed.id, closed.title)?;
            if let Cleanup::Failed(reason) = &closed.cleanup {
                writeln!(
                    out,
                    "  warning: old file {} was not removed: {reason}",
                    file_name(&closed.old_path)
                )?;
            }
        }

        for pass in &report.renames {
            write_renames(&mut out, pass)?;
        }

        writeln!(out, "✓ Synchronized {}", self.project.display())?;
        Ok(out)
    }
}

#[derive(Debug, Serialize)]
pub struct RenameOutput {
    pub project: PathBuf,
    #[serde(flatten)]
    pub report: RenameReport,
}

impl FormattedOutput for RenameOutput {
    fn format_text(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        write_renames(&mut out, &self.report)?;
        writeln!(
            out,
            "✓ Renamed {} files in {}",
            self.report.renamed(),
            self.project.display()
        )?;
        Ok(out)
    }
}

fn write_renames(out: &mut String, report: &RenameReport) -> fmt::Result {
    write_enforcement(out, &report.epics)?;
    write_enforcement(out, &report.issues)
}

fn write_enforcement(out: &mut String, report: &EnforcementReport) -> fmt::Result {
    for rename in &report.renamed {
        let replaced = if rename.replaced { " (replaced existing file)" } else { "" };
        writeln!(
            out,
            "Renamed {} -> {}{replaced}",
            file_name(&rename.from),
            file_name(&rename.to)
        )?;
    }
    for path in &report.skipped {
        writeln!(out, "  warning: skipped unparseable file {}", file_name(path))?;
    }
    for (path, reason) in &report.failed {
        writeln!(out, "  warning: could not rename {}: {reason}", file_name(path))?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct WatchOutput {
    /// Projects watched when the command finished.
    pub stopped: Vec<PathBuf>,
    /// Projects whose lease was released from elsewhere.
    pub released: Vec<PathBuf>,
    pub reason: ShutdownReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShutdownReason {
    Signal,
    AllReleased,
}

impl FormattedOutput for WatchOutput {
    fn format_text(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        for project in &self.stopped {
            writeln!(out, "Stopped watching {}", project.display())?;
        }
        match self.reason {
            ShutdownReason::Signal => writeln!(out, "✓ Watch ended by signal")?,
            ShutdownReason::AllReleased => writeln!(out, "✓ Watch ended: every project was unwatched")?,
        }
        Ok(out)
    }
}

#[derive(Debug, Serialize)]
pub struct UnwatchOutput {
    pub released: Vec<PathBuf>,
}

impl FormattedOutput for UnwatchOutput {
    fn format_text(&self) -> Result<String, fmt::Error> {
        let text = match self.released.as_slice() {
            [] => "No projects are being watched".to_string(),
            [project] => format!("✓ Stopped watching {}", display(project)),
            projects => {
                let mut out = String::new();
                for project in projects {
                    writeln!(out, "  {}", display(project))?;
                }
                writeln!(out, "✓ Stopped watching all {} projects", projects.len())?;
                out
            }
        };
        Ok(text)
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
