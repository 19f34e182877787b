//! `depthcmp-compare` -- summarise and chart two finished training runs.
//!
//! # Environment variables
//!
//! | Variable   | Required | Default            | Description           |
//! |------------|----------|--------------------|-----------------------|
//! | `RUST_LOG` | no       | `depthcmp=info`    | Tracing filter        |

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use depthcmp_compare::{Comparator, ComparisonOutcome};
use depthcmp_core::events::LogBackend;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Compare weak vs strong depth supervision training results.
#[derive(Debug, Parser)]
#[command(name = "depthcmp-compare", version)]
struct Cli {
    /// Model directory of the weak supervision run.
    #[arg(long)]
    weak: PathBuf,

    /// Model directory of the strong supervision run.
    #[arg(long)]
    strong: PathBuf,

    /// Where the summary JSON and chart are written.
    #[arg(long, default_value = "comparison_results")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "depthcmp_compare=info,depthcmp_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    tracing::info!(
        weak = %cli.weak.display(),
        strong = %cli.strong.display(),
        output = %cli.output.display(),
        "Starting depthcmp-compare",
    );

    let comparator = Comparator::new(LogBackend::detect());
    let mut stdout = std::io::stdout().lock();
    let outcome = comparator
        .compare(&cli.weak, &cli.strong, &cli.output, &mut stdout)
        .context("comparison failed")?;

    if let ComparisonOutcome::NoData = outcome {
        tracing::info!("Nothing to compare");
    }

    Ok(())
}
