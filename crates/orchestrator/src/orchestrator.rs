//! Launch both trainers, wait for them, then compare the results.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use depthcmp_compare::{Comparator, ComparisonOutcome};
use depthcmp_core::events::LogBackend;
use depthcmp_core::trainer::{ExitReport, TrainerInvocation, TrainerLauncher, TrainerProcess};

use crate::config::RunConfig;
use crate::error::OrchestratorError;

/// Comparison output directory, relative to the run's output base.
pub const COMPARISON_DIR: &str = "comparison_results";

const RULE_WIDTH: usize = 80;

#[derive(Debug)]
pub enum RunOutcome {
    /// Cancelled while training. Both trainers were stopped; no comparison ran.
    Interrupted,
    Completed {
        weak: ExitReport,
        strong: ExitReport,
        comparison: ComparisonOutcome,
    },
}

pub struct Orchestrator<L> {
    launcher: L,
    comparator: Arc<Comparator>,
}

impl<L: TrainerLauncher> Orchestrator<L> {
    pub fn new(launcher: L) -> Self {
        Self::with_comparator(launcher, Comparator::new(LogBackend::detect()))
    }

    pub fn with_comparator(launcher: L, comparator: Comparator) -> Self {
        Self {
            launcher,
            comparator: Arc::new(comparator),
        }
    }

    /// Run both trainers to completion (or cancellation) and compare them.
    ///
    /// Nothing is launched unless every input path exists.
    pub async fn run<W: Write>(
        &self,
        config: &RunConfig,
        out: &mut W,
        cancel: CancellationToken,
    ) -> Result<RunOutcome, OrchestratorError> {
        config.validate()?;

        std::fs::create_dir_all(&config.output_base).map_err(|source| {
            OrchestratorError::CreateOutput {
                path: config.output_base.clone(),
                source,
            }
        })?;

        let rule = "=".repeat(RULE_WIDTH);
        writeln!(out, "{rule}")?;
        writeln!(out, "STARTING COMPARATIVE TRAINING")?;
        writeln!(out, "{rule}")?;
        writeln!(out, "Scene path: {}", config.scene.display())?;
        writeln!(out, "Depth images (weak): {}", config.depth_images.display())?;
        writeln!(out, "GT depth (strong): {}", config.gt_depth().display())?;
        writeln!(out, "Output base: {}", config.output_base.display())?;
        writeln!(out, "{rule}")?;

        let weak_run = config.weak_invocation();
        let strong_run = config.strong_invocation();

        writeln!(out)?;
        writeln!(out, "1. WEAK SUPERVISION TRAINING")?;
        let mut weak = self.launch(config, &weak_run, out)?;

        writeln!(out)?;
        writeln!(out, "2. STRONG SUPERVISION TRAINING")?;
        let mut strong = match self.launch(config, &strong_run, out) {
            Ok(process) => process,
            Err(e) => {
                tracing::error!(error = %e, "Strong run failed to start, stopping weak run");
                if let Err(stop_err) = weak.terminate().await {
                    tracing::error!(error = %stop_err, "Failed to stop weak run");
                }
                return Err(e);
            }
        };

        writeln!(out)?;
        writeln!(out, "{rule}")?;
        writeln!(out, "BOTH TRAINING PROCESSES STARTED")?;
        writeln!(out, "{rule}")?;
        writeln!(out, "Weak supervision PID: {}", pid_label(&weak))?;
        writeln!(out, "Strong supervision PID: {}", pid_label(&strong))?;
        writeln!(out)?;
        writeln!(out, "Monitoring commands:")?;
        writeln!(out, "depthcmp-monitor {}", weak_run.model_dir().display())?;
        writeln!(out, "depthcmp-monitor {}", strong_run.model_dir().display())?;
        writeln!(out)?;
        writeln!(
            out,
            "Tensorboard: tensorboard --logdir {} --port 6006",
            config.output_base.display()
        )?;
        writeln!(out)?;
        writeln!(
            out,
            "Comparison: depthcmp-compare --weak {} --strong {}",
            weak_run.model_dir().display(),
            strong_run.model_dir().display()
        )?;
        writeln!(out, "{rule}")?;
        out.flush()?;

        let finished = tokio::select! {
            _ = cancel.cancelled() => None,
            results = async { tokio::join!(weak.wait(), strong.wait()) } => Some(results),
        };

        let Some((weak_exit, strong_exit)) = finished else {
            writeln!(out)?;
            writeln!(out, "Training interrupted by user.")?;
            out.flush()?;
            tracing::info!("Cancellation requested, stopping both trainers");

            let (weak_stop, strong_stop) = tokio::join!(weak.terminate(), strong.terminate());
            weak_stop?;
            strong_stop?;
            return Ok(RunOutcome::Interrupted);
        };
        let (weak_exit, strong_exit) = (weak_exit?, strong_exit?);

        writeln!(out)?;
        writeln!(out, "Training completed!")?;
        writeln!(out, "Weak supervision exit code: {}", weak_exit.exit_code)?;
        writeln!(out, "Strong supervision exit code: {}", strong_exit.exit_code)?;
        if !(weak_exit.success() && strong_exit.success()) {
            tracing::warn!(
                weak = weak_exit.exit_code,
                strong = strong_exit.exit_code,
                "A trainer exited with a failure code, comparing whatever was logged"
            );
        }

        writeln!(out)?;
        writeln!(out, "Running automatic comparison...")?;
        out.flush()?;
        let comparison = self
            .compare(
                weak_run.model_dir().to_path_buf(),
                strong_run.model_dir().to_path_buf(),
                config.output_base.join(COMPARISON_DIR),
                out,
            )
            .await?;

        Ok(RunOutcome::Completed {
            weak: weak_exit,
            strong: strong_exit,
            comparison,
        })
    }

    /// Event decoding and chart rendering block, so the comparison runs on
    /// the blocking pool and its report is copied to `out` afterwards.
    async fn compare<W: Write>(
        &self,
        weak_dir: PathBuf,
        strong_dir: PathBuf,
        output_dir: PathBuf,
        out: &mut W,
    ) -> Result<ComparisonOutcome, OrchestratorError> {
        let comparator = Arc::clone(&self.comparator);
        let (report, result) = tokio::task::spawn_blocking(move || {
            let mut report = Vec::new();
            let result = comparator.compare(&weak_dir, &strong_dir, &output_dir, &mut report);
            (report, result)
        })
        .await
        .map_err(OrchestratorError::ComparisonTask)?;

        out.write_all(&report)?;
        out.flush()?;
        Ok(result?)
    }

    fn launch<W: Write>(
        &self,
        config: &RunConfig,
        invocation: &TrainerInvocation,
        out: &mut W,
    ) -> Result<L::Process, OrchestratorError> {
        writeln!(out, "Command: {}", invocation.command_line(&config.program))?;
        writeln!(out)?;
        writeln!(out, "Starting {} supervision training...", invocation.mode())?;
        out.flush()?;
        Ok(self.launcher.launch(invocation)?)
    }
}

fn pid_label(process: &impl TrainerProcess) -> String {
    process
        .id()
        .map_or_else(|| "unknown".to_string(), |pid| pid.to_string())
}
