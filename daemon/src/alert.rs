use std::time::Duration;
use tracing::{debug, info, warn};

use diskwatch_core::format::format_bytes;
use diskwatch_core::{DiskInfo, SnapshotStore};

use crate::config::DaemonConfig;

/// Names of disks whose free fraction is below `threshold`.
pub fn low_disk_names(disks: &[DiskInfo], threshold: f64) -> Vec<String> {
    disks
        .iter()
        .filter(|d| d.total_space > 0)
        .filter(|d| (d.available_space as f64 / d.total_space as f64) < threshold)
        .map(|d| d.name.clone())
        .collect()
}

/// Start the background task that evaluates the latest snapshot for
/// low-space disks and logs transitions.
pub fn start_alert_task(store: SnapshotStore, config: DaemonConfig) {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(config.alert_check_secs.max(1)));
        ticker.tick().await; // skip the immediate first tick
        let mut was_low = false;
        loop {
            ticker.tick().await;
            let snapshot = store.snapshot().await;
            for disk in &snapshot.disks {
                let used_pct = format!("{:.1}", disk.used_percentage());
                debug!(
                    name = %disk.name,
                    used = %format_bytes(disk.used_space()),
                    total = %format_bytes(disk.total_space),
                    used_pct = %used_pct,
                    "Disk usage"
                );
            }

            let low = low_disk_names(&snapshot.disks, config.low_space_threshold);
            if low.is_empty() {
                if was_low {
                    info!("Disk space recovered, all disks above threshold");
                }
                was_low = false;
            } else {
                warn!(disks = %low.join(", "), "Low disk space");
                was_low = true;
            }
        }
    });
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

    #[test]
    fn test_low_disk_threshold_detection() {
        let disks = vec![
            disk("Healthy", 100, 50),
            // 5% free is under the 10% threshold.
            disk("Low", 100, 5),
        ];

        let low = low_disk_names(&disks, 0.10);
        assert_eq!(low, vec!["Low".to_string()]);
    }

    #[test]
    fn test_exactly_at_threshold_is_not_low() {
        let disks = vec![disk("Edge", 100, 10)];
        assert!(low_disk_names(&disks, 0.10).is_empty());
    }

    #[test]
    fn test_zero_total_is_skipped() {
        let disks = vec![disk("phantom", 0, 0)];
        assert!(low_disk_names(&disks, 0.10).is_empty());
    }
}
