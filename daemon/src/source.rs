use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use sysinfo::Disks;
use tracing::debug;

use diskwatch_core::{CleanupAction, DiskDataSource, DiskInfo};

use crate::config::DaemonConfig;

/// Disk data source backed by the local machine.
///
/// The cadence side of the contract re-reads the daemon's own config
/// file, so an operator can edit `poll_interval_minutes` on disk and the
/// poller adopts the new cadence at the end of the next cycle.
pub struct SystemDiskSource {
    config_path: PathBuf,
    fallback: DaemonConfig,
}

impl SystemDiskSource {
    pub fn new(config_path: PathBuf, fallback: DaemonConfig) -> Self {
        Self {
            config_path,
            fallback,
        }
    }
}

/// Collect usage for all real mounts.
fn collect_disks() -> Vec<DiskInfo> {
    let disks = Disks::new_with_refreshed_list();
    disks
        .iter()
        .filter(|d| {
            // Filter out pseudo-filesystems.
            let fs = d.file_system().to_string_lossy();
            !fs.starts_with("tmpfs") && !fs.starts_with("devtmpfs") && !fs.starts_with("squashfs")
        })
        .map(|d| DiskInfo {
            name: d.name().to_string_lossy().into_owned(),
            total_space: d.total_space(),
            available_space: d.available_space(),
        })
        .collect()
}

#[async_trait]
impl DiskDataSource for SystemDiskSource {
    async fn fetch_disks(&self) -> Result<Vec<DiskInfo>> {
        let disks = collect_disks();
        debug!(count = disks.len(), "Collected disks");
        Ok(disks)
    }

    async fn fetch_poll_interval_minutes(&self) -> Result<i64> {
        let config = match tokio::fs::read_to_string(&self.config_path).await {
            Ok(text) => toml::de::from_str::<DaemonConfig>(&text).with_context(|| {
                format!("invalid config at {}", self.config_path.display())
            })?,
            // A config file that never existed is not an error: keep the
            // interval the daemon started with.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => self.fallback.clone(),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("cannot read config at {}", self.config_path.display())
                })
            }
        };
        Ok(config.poll_interval_minutes)
    }
}

/// Launches the configured cleanup command, detached.
pub struct CommandCleanup {
    command: Option<Vec<String>>,
}

impl CommandCleanup {
    pub fn new(command: Option<Vec<String>>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl CleanupAction for CommandCleanup {
    async fn launch_cleanup(&self) -> Result<()> {
        let argv = match &self.command {
            Some(argv) if !argv.is_empty() => argv,
            _ => bail!("no cleanup command configured"),
        };
        let child = tokio::process::Command::new(&argv[0])
            .args(&argv[1..])
            .spawn()
            .with_context(|| format!("failed to launch {}", argv[0]))?;
        debug!(pid = ?child.id(), command = %argv.join(" "), "Cleanup tool launched");
        Ok(())
    }
}
