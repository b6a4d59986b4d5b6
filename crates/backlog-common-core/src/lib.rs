//! Backlog common core types and utilities.
//!
//! Defines the metadata model shared by every other crate (issues, epics,
//! priority rows) and the error taxonomy used by the reconciliation engine.

pub mod error;
pub mod model;
pub mod status;

pub use error::{Error, Result};
pub use model::*;
pub use status::Status;
