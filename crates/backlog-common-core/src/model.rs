//! Backlog metadata model.
//!
//! These are plain data contracts. Every value is rebuilt from disk on each
//! read; nothing here is cached between invocations.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::status::Status;

/// Which directory an entity lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Issue,
    Epic,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue => f.write_str("issue"),
            Self::Epic => f.write_str("epic"),
        }
    }
}

/// A backlog issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Issue {
    /// Unique positive identifier within the issues directory.
    pub id: u32,
    pub title: String,
    pub status: Status,
    /// Parent epic identifier. The epic does not have to exist.
    pub epic: u32,
    /// Story points.
    pub estimate: u32,
    /// Markdown body following the header.
    #[serde(skip)]
    pub content: String,
}

/// A group of issues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Epic {
    pub id: u32,
    pub title: String,
    pub status: Status,
    #[serde(skip)]
    pub content: String,
}

/// One line of the priority list: a denormalized open issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityRow {
    pub id: u32,
    pub title: String,
    pub epic: u32,
    pub estimate: u32,
}

impl From<&Issue> for PriorityRow {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id,
            title: issue.title.clone(),
            epic: issue.epic,
            estimate: issue.estimate,
        }
    }
}

/// Behavior shared by documents stored as one markdown file each.
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug {
    /// Directory kind this entity is stored in.
    const KIND: EntityKind;

    fn id(&self) -> u32;
    fn title(&self) -> &str;
    fn status(&self) -> Status;
    fn set_status(&mut self, status: Status);
    fn content(&self) -> &str;
    fn set_content(&mut self, content: String);

    /// Check identity fields after decoding.
    fn validate(&self) -> Result<()> {
        if self.id() == 0 {
            return Err(Error::invalid_field("id", "must be a positive integer"));
        }
        if self.title().trim().is_empty() {
            return Err(Error::invalid_field("title", "must not be empty"));
        }
        Ok(())
    }
}

impl Entity for Issue {
    const KIND: EntityKind = EntityKind::Issue;

    fn id(&self) -> u32 {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn set_content(&mut self, content: String) {
        self.content = content;
    }

    fn validate(&self) -> Result<()> {
        if self.id == 0 {
            return Err(Error::invalid_field("id", "must be a positive integer"));
        }
        if self.title.trim().is_empty() {
            return Err(Error::invalid_field("title", "must not be empty"));
        }
        if self.epic == 0 {
            return Err(Error::invalid_field("epic", "must reference a positive epic id"));
        }
        Ok(())
    }
}

impl Entity for Epic {
    const KIND: EntityKind = EntityKind::Epic;

    fn id(&self) -> u32 {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn status(&self) -> Status {
        self.status
    }

    fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn set_content(&mut self, content: String) {
        self.content = content;
    }
}
