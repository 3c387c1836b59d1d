use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::source::DiskInfo;

/// The latest known disk usage snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SnapshotState {
    /// Disks in source order. The order matters for display, not for
    /// correctness.
    pub disks: Vec<DiskInfo>,
    /// When the last successful fetch completed.
    pub last_updated: Option<DateTime<Utc>>,
    /// Whether a fetch cycle is currently visible as in progress.
    pub is_loading: bool,
}

/// Cheaply cloneable handle to the shared snapshot.
///
/// The poller is the only writer; any number of readers may call
/// [`snapshot`](SnapshotStore::snapshot) and see either the previous or
/// the new state, never a mix.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    state: Arc<RwLock<SnapshotState>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a fetch cycle as started.
    pub async fn begin_load(&self) {
        self.state.write().await.is_loading = true;
    }

    /// Commit a successful fetch: replace the disk list, stamp the update
    /// time and clear the loading flag.
    pub async fn complete_load(&self, disks: Vec<DiskInfo>) {
        let mut state = self.state.write().await;
        state.disks = disks;
        state.last_updated = Some(Utc::now());
        state.is_loading = false;
    }

    /// Record a failed fetch. The previous disks and timestamp are kept:
    /// stale data beats a blank display.
    pub async fn fail_load(&self) {
        self.state.write().await.is_loading = false;
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> SnapshotState {
        self.state.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disk(name: &str, total: u64, available: u64) -> DiskInfo {
        DiskInfo {
            name: name.into(),
            total_space: total,
            available_space: available,
        }
    }

    #[tokio::test]
    async fn test_initial_state_is_empty() {
        let store = SnapshotStore::new();
        let state = store.snapshot().await;
        assert!(state.disks.is_empty());
        assert!(state.last_updated.is_none());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_complete_load_commits_and_clears_loading() {
        let store = SnapshotStore::new();
        store.begin_load().await;
        assert!(store.snapshot().await.is_loading);

        store.complete_load(vec![disk("C:", 1000, 100)]).await;
        let state = store.snapshot().await;
        assert_eq!(state.disks.len(), 1);
        assert_eq!(state.disks[0].name, "C:");
        assert!(state.last_updated.is_some());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_fail_load_keeps_previous_snapshot() {
        let store = SnapshotStore::new();
        store.complete_load(vec![disk("C:", 1000, 100)]).await;
        let before = store.snapshot().await;

        store.begin_load().await;
        store.fail_load().await;

        let after = store.snapshot().await;
        assert_eq!(after.disks, before.disks);
        assert_eq!(after.last_updated, before.last_updated);
        assert!(!after.is_loading);
    }
}
