use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Daemon configuration loaded from a TOML file or defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Polling cadence in minutes. Zero disables recurring polls.
    ///
    /// The running daemon re-reads this value at the end of every fetch
    /// cycle, so edits to the file take effect without a restart.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_minutes: i64,

    /// Fraction of free space below which a disk counts as low.
    #[serde(default = "default_low_space_threshold")]
    pub low_space_threshold: f64,

    /// Seconds between low-space evaluations of the latest snapshot.
    #[serde(default = "default_alert_check_secs")]
    pub alert_check_secs: u64,

    /// Command line used to launch the external cleanup tool.
    #[serde(default = "default_cleanup_command")]
    pub cleanup_command: Option<Vec<String>>,
}

fn default_poll_interval() -> i64 {
    60
}

fn default_low_space_threshold() -> f64 {
    0.10
}

fn default_alert_check_secs() -> u64 {
    900
}

fn default_cleanup_command() -> Option<Vec<String>> {
    if cfg!(target_os = "windows") {
        Some(vec!["cleanmgr.exe".to_string(), "/lowdisk".to_string()])
    } else {
        None
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval_minutes: default_poll_interval(),
            low_space_threshold: default_low_space_threshold(),
            alert_check_secs: default_alert_check_secs(),
            cleanup_command: default_cleanup_command(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: DaemonConfig = toml::de::from_str(&contents)?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file does not
    /// exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Per-user config location, or the system-wide path when no user config
/// directory is available.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("diskwatch").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("/etc/diskwatch/config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: DaemonConfig = toml::de::from_str("").unwrap();
        assert_eq!(config.poll_interval_minutes, 60);
        assert_eq!(config.low_space_threshold, 0.10);
        assert_eq!(config.alert_check_secs, 900);
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let config: DaemonConfig = toml::de::from_str(
            r#"
            poll_interval_minutes = 15
            low_space_threshold = 0.2
            alert_check_secs = 60
            cleanup_command = ["du", "-sh"]
            "#,
        )
        .unwrap();
        assert_eq!(config.poll_interval_minutes, 15);
        assert_eq!(config.low_space_threshold, 0.2);
        assert_eq!(config.alert_check_secs, 60);
        assert_eq!(
            config.cleanup_command,
            Some(vec!["du".to_string(), "-sh".to_string()])
        );
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = DaemonConfig::load(Path::new("/nonexistent/diskwatch.toml")).unwrap();
        assert_eq!(config.poll_interval_minutes, 60);
    }
}
