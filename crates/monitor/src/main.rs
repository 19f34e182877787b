//! `depthcmp-monitor` -- print live progress of a training run.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default | Description                      |
//! |------------------------|----------|---------|----------------------------------|
//! | `MONITOR_REFRESH_SECS` | no       | `30`    | Seconds between polls            |
//! | `RUST_LOG`             | no       | `depthcmp_monitor=info` | Tracing filter   |

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use depthcmp_core::events::LogBackend;
use depthcmp_core::shutdown::cancel_on_signal;
use depthcmp_monitor::Monitor;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Monitor depth supervision training progress.
#[derive(Debug, Parser)]
#[command(name = "depthcmp-monitor", version)]
struct Cli {
    /// Path to the model output directory.
    model_dir: PathBuf,

    /// Refresh interval in seconds.
    #[arg(long, env = "MONITOR_REFRESH_SECS", default_value_t = 30)]
    refresh: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "depthcmp_monitor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if !cli.model_dir.exists() {
        tracing::error!(dir = %cli.model_dir.display(), "Model directory does not exist");
        std::process::exit(1);
    }

    println!("Monitoring training in: {}", cli.model_dir.display());
    println!("Refresh interval: {} seconds", cli.refresh);
    println!("Press Ctrl+C to stop monitoring");

    let cancel = cancel_on_signal();
    let refresh = Duration::from_secs(cli.refresh.max(1));
    let mut monitor = Monitor::new(LogBackend::detect(), cli.model_dir).with_refresh(refresh);

    let mut stdout = std::io::stdout();
    monitor.run(&mut stdout, cancel).await?;

    Ok(())
}
