//! `depthcmp-run` -- train weak and strong depth supervision side by side.
//!
//! # Environment variables
//!
//! | Variable         | Required | Default    | Description                   |
//! |------------------|----------|------------|-------------------------------|
//! | `TRAINER_PYTHON` | no       | `python`   | Interpreter for the trainer   |
//! | `TRAINER_SCRIPT` | no       | `train.py` | Trainer entry point           |
//! | `RUST_LOG`       | no       | `depthcmp_orchestrator=info` | Tracing filter |

use std::path::PathBuf;

use clap::Parser;
use depthcmp_core::shutdown::cancel_on_signal;
use depthcmp_core::trainer::{ProcessLauncher, StrongSupervision, TrainerProgram};
use depthcmp_orchestrator::{Orchestrator, OrchestratorError, RunConfig, RunOutcome};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Run comparative depth supervision training.
#[derive(Debug, Parser)]
#[command(name = "depthcmp-run", version)]
struct Cli {
    /// Scene path.
    #[arg(short = 's', long)]
    scene: PathBuf,

    /// Weak supervision depth images path.
    #[arg(short = 'd', long = "depth_images")]
    depth_images: PathBuf,

    /// Strong supervision GT depth path.
    #[arg(long = "gt_depth")]
    gt_depth: PathBuf,

    /// Output base directory.
    #[arg(short = 'o', long, default_value = "comparison_training")]
    output: PathBuf,

    /// Interpreter used to run the trainer.
    #[arg(long, env = "TRAINER_PYTHON", default_value = "python")]
    python: String,

    /// Trainer entry point.
    #[arg(long = "train-script", env = "TRAINER_SCRIPT", default_value = "train.py")]
    train_script: PathBuf,

    /// Depth loss weight for the strong run.
    #[arg(long = "depth-weight", default_value_t = StrongSupervision::DEFAULT_WEIGHT)]
    depth_weight: f64,

    /// Depth gradient loss weight for the strong run.
    #[arg(long = "depth-grad-weight", default_value_t = StrongSupervision::DEFAULT_GRAD_WEIGHT)]
    depth_grad_weight: f64,

    /// Iterations before depth loss kicks in for the strong run.
    #[arg(long = "depth-warmup", default_value_t = StrongSupervision::DEFAULT_WARMUP)]
    depth_warmup: u32,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        let mut config = RunConfig::new(self.scene, self.depth_images, self.gt_depth, self.output);
        config.program = TrainerProgram {
            interpreter: self.python,
            script: self.train_script,
            working_dir: None,
        };
        config.strong.depth_weight = self.depth_weight;
        config.strong.depth_grad_weight = self.depth_grad_weight;
        config.strong.depth_warmup = self.depth_warmup;
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "depthcmp_orchestrator=info,depthcmp_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Cli::parse().into_config();

    tracing::info!(
        scene = %config.scene.display(),
        output = %config.output_base.display(),
        trainer = %config.program,
        "Starting depthcmp-run",
    );

    let orchestrator = Orchestrator::new(ProcessLauncher::new(config.program.clone()));
    let cancel = cancel_on_signal();
    let mut stdout = std::io::stdout();

    match orchestrator.run(&config, &mut stdout, cancel).await {
        Ok(RunOutcome::Completed { weak, strong, .. }) => {
            tracing::info!(weak = weak.exit_code, strong = strong.exit_code, "Run finished");
            Ok(())
        }
        Ok(RunOutcome::Interrupted) => Ok(()),
        Err(e @ OrchestratorError::MissingInput { .. }) => {
            println!("{e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
