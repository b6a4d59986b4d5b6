//! Backlog item status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Error;

/// Status of an issue or epic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    /// Still being worked on.
    #[default]
    Open,
    /// Done.
    Close,
}

impl Status {
    /// Single letter used in canonical filenames.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Open => "O",
            Self::Close => "C",
        }
    }

    /// Interpret a free-form status string the way filenames do:
    /// anything equal to `close` ignoring case is closed, the rest is open.
    pub fn from_text_lossy(s: &str) -> Self {
        if s.eq_ignore_ascii_case("close") {
            Self::Close
        } else {
            Self::Open
        }
    }

    /// Decode the single letter status segment of a filename.
    pub fn from_code(code: &str) -> Self {
        if code == "C" {
            Self::Close
        } else {
            Self::Open
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Close)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("Open"),
            Self::Close => f.write_str("Close"),
        }
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "close" | "closed" => Ok(Self::Close),
            other => Err(Error::invalid_field(
                "status",
                format!("expected Open or Close, got `{other}`"),
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
