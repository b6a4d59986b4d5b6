//! CLI error handling and formatting.

use std::io;
use std::process::ExitCode;

use thiserror::Error;

use backlog_common_config::{ConfigError, EnvError};
use backlog_watch::WatchError;

use crate::cli::OutputFormat;

/// Application exit codes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    IoError = 3,
    DocumentError = 4,
    WatchError = 5,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

/// CLI error type with context for the user
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: io::Error,
    },

    #[error("{source}")]
    Backlog {
        #[source]
        source: backlog_common_core::Error,
    },

    #[error("{source}")]
    Watch {
        #[source]
        source: WatchError,
        hint: Option<String>,
    },

    #[error("{message}")]
    User {
        message: String,
        hint: Option<String>,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "E001",
            Self::Io { .. } => "E002",
            Self::Backlog { source } if source.is_structural() => "E003",
            Self::Backlog { .. } => "E004",
            Self::Watch { .. } => "E005",
            Self::User { .. } => "E010",
            Self::Other(_) => "E999",
        }
    }

    pub fn exit(&self) -> Exit {
        match self {
            Self::Config { .. } => Exit::ConfigError,
            Self::Io { .. } => Exit::IoError,
            Self::Backlog { source } if source.is_structural() => Exit::DocumentError,
            Self::Backlog { .. } => Exit::IoError,
            Self::Watch { .. } => Exit::WatchError,
            Self::User { .. } | Self::Other(_) => Exit::GeneralError,
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        self.exit().into()
    }

    /// Get hint for this error if available
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. } | Self::User { hint, .. } | Self::Watch { hint, .. } => {
                hint.as_deref()
            }
            _ => None,
        }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a user error with hint
    pub fn user_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Render for stderr.
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "error": {
                        "code": self.code(),
                        "message": self.to_string(),
                        "hint": self.hint(),
                    }
                });
                serde_json::to_string_pretty(&json).unwrap_or_else(|_| self.to_string())
            }
            OutputFormat::Text => {
                let mut output = format!("error[{}]: {self}", self.code());
                if let Some(hint) = self.hint() {
                    output.push_str("\n\nhint: ");
                    output.push_str(hint);
                }
                output
            }
        }
    }
}

// Conversion implementations
impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(anyhow::anyhow!("JSON serialization failed: {err}"))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config {
            message: format!("Configuration error: {err}"),
            source: Some(Box::new(err)),
            hint: Some("Check .backlog/config.yaml and the BACKLOG_* environment variables".to_string()),
        }
    }
}

impl From<EnvError> for CliError {
    fn from(err: EnvError) -> Self {
        Self::Config {
            message: format!("Environment error: {err}"),
            source: Some(Box::new(err)),
            hint: Some("Check your .env files".to_string()),
        }
    }
}

impl From<backlog_common_core::Error> for CliError {
    fn from(err: backlog_common_core::Error) -> Self {
        Self::Backlog { source: err }
    }
}

impl From<WatchError> for CliError {
    fn from(err: WatchError) -> Self {
        let hint = match &err {
            WatchError::ProjectNotFound { .. } | WatchError::IssuesDirMissing { .. } => {
                Some("Run `instant-backlog init` to create the project layout".to_string())
            }
            WatchError::NotWatching { .. } => {
                Some("Run `instant-backlog unwatch` without a path to stop every watch".to_string())
            }
            WatchError::LeaseHeld { project, .. } => Some(format!(
                "If no watch is running, clear the stale lease with `instant-backlog unwatch {}`",
                project.display()
            )),
            _ => None,
        };
        Self::Watch { source: err, hint }
    }
}
