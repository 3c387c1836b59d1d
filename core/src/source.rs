use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Usage numbers for a single disk, in the order the source reported them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskInfo {
    pub name: String,
    pub total_space: u64,
    pub available_space: u64,
}

impl DiskInfo {
    /// Bytes in use, saturating at zero if the source reports more
    /// available than total space.
    pub fn used_space(&self) -> u64 {
        self.total_space.saturating_sub(self.available_space)
    }

    /// Used fraction as a percentage, computed in signed float math so a
    /// source reporting `available_space > total_space` yields a negative
    /// value rather than a panic. A zero total yields `0.0`.
    pub fn used_percentage(&self) -> f64 {
        if self.total_space == 0 {
            return 0.0;
        }
        let used = self.total_space as f64 - self.available_space as f64;
        used / self.total_space as f64 * 100.0
    }
}

/// Provider of disk snapshots and the desired polling cadence.
#[async_trait]
pub trait DiskDataSource: Send + Sync {
    /// Fetch the current disk list, in display order.
    async fn fetch_disks(&self) -> Result<Vec<DiskInfo>>;

    /// Fetch the desired polling cadence in minutes.
    ///
    /// Zero disables recurring polls. The reported value is authoritative
    /// over whatever cadence the poller is currently scheduled at.
    async fn fetch_poll_interval_minutes(&self) -> Result<i64>;
}

#[async_trait]
impl<T: DiskDataSource + ?Sized> DiskDataSource for Arc<T> {
    async fn fetch_disks(&self) -> Result<Vec<DiskInfo>> {
        (**self).fetch_disks().await
    }

    async fn fetch_poll_interval_minutes(&self) -> Result<i64> {
        (**self).fetch_poll_interval_minutes().await
    }
}

/// One-shot external remediation, e.g. the OS disk cleanup tool.
#[async_trait]
pub trait CleanupAction: Send + Sync {
    async fn launch_cleanup(&self) -> Result<()>;
}

/// Failures surfaced by the polling core.
///
/// All variants are recoverable and isolated to the operation that
/// produced them; none of them stops future scheduled cycles.
#[derive(Debug)]
pub enum PollError {
    /// The disk fetch failed; the cycle aborted before reconciliation.
    FetchDisksFailed(anyhow::Error),
    /// The cadence fetch failed; the snapshot stays committed and the
    /// existing schedule is kept.
    FetchIntervalFailed(anyhow::Error),
    /// The cleanup tool could not be launched.
    CleanupLaunchFailed(anyhow::Error),
}

impl std::fmt::Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollError::FetchDisksFailed(e) => write!(f, "disk fetch failed: {e}"),
            PollError::FetchIntervalFailed(e) => write!(f, "poll interval fetch failed: {e}"),
            PollError::CleanupLaunchFailed(e) => write!(f, "cleanup launch failed: {e}"),
        }
    }
}

impl std::error::Error for PollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PollError::FetchDisksFailed(e)
            | PollError::FetchIntervalFailed(e)
            | PollError::CleanupLaunchFailed(e) => Some(e.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_used_percentage_regular() {
        let disk = DiskInfo {
            name: "C:".into(),
            total_space: 1000,
            available_space: 100,
        };
        assert_eq!(disk.used_space(), 900);
        assert_eq!(disk.used_percentage(), 90.0);
    }

    #[test]
    fn test_used_percentage_zero_total() {
        let disk = DiskInfo {
            name: "empty".into(),
            total_space: 0,
            available_space: 0,
        };
        assert_eq!(disk.used_percentage(), 0.0);
    }

    #[test]
    fn test_malformed_available_exceeding_total_is_tolerated() {
        // Sources can report more available than total; the math must not
        // panic and the percentage goes negative.
        let disk = DiskInfo {
            name: "weird".into(),
            total_space: 100,
            available_space: 150,
        };
        assert_eq!(disk.used_space(), 0);
        assert_eq!(disk.used_percentage(), -50.0);
    }
}
