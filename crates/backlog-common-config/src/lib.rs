//! Configuration types for instant-backlog.
//!
//! This crate provides the configuration read from `.backlog/config.yaml`
//! plus the resolved on-disk layout of a backlog project.

pub mod env;
pub mod layout;
pub mod loader;
pub mod types;

pub use env::*;
pub use layout::*;
pub use loader::*;
pub use types::*;

/// Serializes tests that touch `BACKLOG_*` variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
