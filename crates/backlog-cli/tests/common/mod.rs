//! Common test utilities for CLI testing.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;

use backlog_test_utils::TempProject;

/// Temporary working directory holding a project at `projects/` and a
/// private lease directory.
pub struct TestContext {
    pub project: TempProject,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            project: TempProject::new(),
        }
    }

    /// Working directory without a project in it.
    pub fn empty() -> Self {
        Self {
            project: TempProject::bare(),
        }
    }

    /// Working directory of the command.
    pub fn path(&self) -> &Path {
        self.project.workdir()
    }

    pub fn state_dir(&self) -> PathBuf {
        self.path().join("state")
    }

    /// Write `.backlog/config.yaml`.
    pub fn with_config(self, config: &str) -> Self {
        let dir = self.path().join(".backlog");
        std::fs::create_dir_all(&dir).expect("Failed to create config dir");
        std::fs::write(dir.join("config.yaml"), config).expect("Failed to write config");
        self
    }

    /// Environment shared by every spawned binary.
    pub fn envs(&self) -> Vec<(&'static str, PathBuf)> {
        vec![("BACKLOG_STATE_DIR", self.state_dir())]
    }

    /// A command configured for this context
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("instant-backlog").expect("Binary not found");
        cmd.current_dir(self.path())
            .env_remove("BACKLOG_CONFIG")
            .env_remove("BACKLOG_PROJECT_DIR")
            .env_remove("BACKLOG_DEBOUNCE_MS")
            .env_remove("BACKLOG_LOG_LEVEL")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        for (key, value) in self.envs() {
            cmd.env(key, value);
        }
        cmd
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON output assertions
pub mod json {
    use serde_json::Value;

    pub fn parse_output(output: &[u8]) -> Value {
        serde_json::from_slice(output).expect("Failed to parse JSON output")
    }
}
