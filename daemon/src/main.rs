use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use diskwatch_core::format::format_interval;
use diskwatch_core::{cleanup, AdaptivePoller, DiskDataSource, SnapshotStore};

mod alert;
mod config;
mod source;

/// Diskwatch, a disk space monitor with low-space alerting.
#[derive(Parser, Debug)]
#[command(name = "diskwatch", version, about)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Launch the configured disk cleanup tool once and exit.
    Cleanup,
    /// Fetch one snapshot, print it as JSON and exit.
    Once,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diskwatch=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let cfg = config::DaemonConfig::load(&config_path)?;

    match cli.command {
        Some(Command::Cleanup) => {
            let action = source::CommandCleanup::new(cfg.cleanup_command.clone());
            cleanup::trigger_cleanup(&action).await?;
            return Ok(());
        }
        Some(Command::Once) => {
            let disk_source = source::SystemDiskSource::new(config_path, cfg);
            let disks = disk_source.fetch_disks().await?;
            println!("{}", serde_json::to_string_pretty(&disks)?);
            return Ok(());
        }
        None => {}
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        interval = %format_interval(cfg.poll_interval_minutes.max(0) as u64),
        "Starting diskwatch daemon"
    );

    let disk_source = source::SystemDiskSource::new(config_path, cfg.clone());
    let poller = AdaptivePoller::new(disk_source, SnapshotStore::new());
    poller.start().await;

    alert::start_alert_task(poller.store().clone(), cfg);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    poller.stop().await;

    Ok(())
}
