//! Adaptive disk usage polling engine.
//!
//! The poller fetches disk snapshots from a [`DiskDataSource`] on a cadence
//! the source itself reports, reschedules without drift or overlap when the
//! cadence changes, and publishes results through a [`SnapshotStore`].

pub mod cleanup;
pub mod format;
pub mod poller;
pub mod source;
pub mod store;

pub use poller::{AdaptivePoller, PollerStats, DEFAULT_POLL_INTERVAL_MINUTES};
pub use source::{CleanupAction, DiskDataSource, DiskInfo, PollError};
pub use store::{SnapshotState, SnapshotStore};
