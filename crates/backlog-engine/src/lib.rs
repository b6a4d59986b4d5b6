//! Reconciliation engine for instant-backlog.
//!
//! A backlog project is a directory holding one Markdown document per epic,
//! one per issue, and a CSV priority list of the open issues. This crate
//! keeps the three consistent:
//!
//! - [`priority`] rebuilds the priority list from the open issues while
//!   preserving the order the user chose.
//! - [`closure`] closes an epic once every issue under it is closed.
//! - [`enforce`] renames documents whose file name disagrees with their
//!   header.
//!
//! [`Reconciler`] runs them in the order a `sync` needs.

pub mod closure;
pub mod document;
pub mod enforce;
pub mod filename;
pub mod priority;
pub mod reconcile;
pub mod repository;
pub mod scaffold;

pub use closure::{propagate_closure, ClosureReport, EpicClosure};
pub use enforce::{enforce_filenames, EnforcementReport, FileRename};
pub use filename::FilenameParts;
pub use reconcile::{RenameReport, Reconciler, SyncReport};
pub use repository::{Cleanup, ReplaceOutcome, StoredEntity};
pub use scaffold::{scaffold_project, ScaffoldReport};

pub use backlog_common_core::{Epic, Error, Issue, PriorityRow, Result, Status};
