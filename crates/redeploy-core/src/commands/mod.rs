//! Command layer: the rebuild and sync operations.
//!
//! Each command is built from a [`RedeployConfig`](crate::config::RedeployConfig),
//! can report its plan without side effects, and executes against any
//! [`CommandRunner`](crate::runner::CommandRunner).

mod rebuild;
mod sync;

pub use rebuild::{RebuildCommand, RebuildReport, SyncTarget};
pub use sync::{SyncCommand, SyncReport};
