//! Command implementations.

mod init;
mod rename;
mod sync;
mod unwatch;
mod watch;

pub use init::InitCommand;
pub use rename::RenameCommand;
pub use sync::SyncCommand;
pub use unwatch::UnwatchCommand;
pub use watch::WatchCommand;
