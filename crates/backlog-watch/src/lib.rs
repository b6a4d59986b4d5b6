//! Debounced directory watching for instant-backlog.
//!
//! A [`WatchCoordinator`] owns one [`ProjectWatcher`] per project. Each
//! watcher subscribes to changes in the project's issues directory and,
//! once a burst of changes has gone quiet for the debounce window, asks its
//! [`ReconcileExecutor`] to sync and rename.
//!
//! Watches outlive the command that started them, so a separate `unwatch`
//! invocation talks to them through [`LeaseStore`] files.

pub mod coordinator;
pub mod debounce;
pub mod error;
pub mod events;
pub mod executor;
pub mod lease;
pub mod watcher;

pub use coordinator::WatchCoordinator;
pub use debounce::{DebounceState, Debouncer};
pub use error::WatchError;
pub use events::is_relevant;
pub use executor::{EngineExecutor, ReconcileExecutor};
pub use lease::{LeaseStore, WatchLease};
pub use watcher::ProjectWatcher;

/// Default quiet period before reconciling.
pub const DEFAULT_DEBOUNCE: std::time::Duration = std::time::Duration::from_millis(500);
