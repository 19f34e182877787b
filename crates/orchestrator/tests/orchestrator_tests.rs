//! Orchestrator behaviour against an in-memory trainer.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use depthcmp_compare::{CompareError, ComparisonOutcome};
use depthcmp_core::error::TrainerError;
use depthcmp_core::events::writer::EventFileWriter;
use depthcmp_core::metric_names::TRAIN_L1_LOSS;
use depthcmp_core::trainer::{
    ExitReport, SupervisionMode, TrainerInvocation, TrainerLauncher, TrainerProcess,
};
use depthcmp_orchestrator::{Orchestrator, OrchestratorError, RunConfig, RunOutcome, COMPARISON_DIR};
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// Fake trainer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Launch(SupervisionMode, Vec<String>),
    Terminate(SupervisionMode),
}

#[derive(Clone, Copy)]
enum Behaviour {
    /// Log one L1 value, then exit with the given code.
    Finish(f32, i32),
    /// Never exit on its own.
    Hang,
    /// Fail to start.
    FailToStart,
}

struct FakeLauncher {
    weak: Behaviour,
    strong: Behaviour,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeLauncher {
    fn new(weak: Behaviour, strong: Behaviour) -> Self {
        Self {
            weak,
            strong,
            calls: Arc::default(),
        }
    }
}

struct FakeProcess {
    mode: SupervisionMode,
    behaviour: Behaviour,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl TrainerLauncher for FakeLauncher {
    type Process = FakeProcess;

    fn launch(&self, invocation: &TrainerInvocation) -> Result<FakeProcess, TrainerError> {
        let mode = invocation.mode();
        let behaviour = match mode {
            SupervisionMode::Weak => self.weak,
            SupervisionMode::Strong => self.strong,
        };

        if let Behaviour::FailToStart = behaviour {
            return Err(TrainerError::Spawn {
                mode: mode.as_str(),
                program: "fake train.py".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no trainer"),
            });
        }

        self.calls
            .lock()
            .unwrap()
            .push(Call::Launch(mode, invocation.args().to_vec()));

        if let Behaviour::Finish(l1, _) = behaviour {
            write_l1(invocation.model_dir(), l1);
        }

        Ok(FakeProcess {
            mode,
            behaviour,
            calls: Arc::clone(&self.calls),
        })
    }
}

impl TrainerProcess for FakeProcess {
    fn mode(&self) -> SupervisionMode {
        self.mode
    }

    fn id(&self) -> Option<u32> {
        Some(match self.mode {
            SupervisionMode::Weak => 1001,
            SupervisionMode::Strong => 1002,
        })
    }

    async fn wait(&mut self) -> Result<ExitReport, TrainerError> {
        match self.behaviour {
            Behaviour::Finish(_, exit_code) => Ok(ExitReport {
                mode: self.mode,
                exit_code,
            }),
            _ => std::future::pending().await,
        }
    }

    async fn terminate(&mut self) -> Result<ExitReport, TrainerError> {
        self.calls.lock().unwrap().push(Call::Terminate(self.mode));
        Ok(ExitReport {
            mode: self.mode,
            exit_code: -1,
        })
    }
}

fn write_l1(model_dir: &Path, value: f32) {
    let mut writer = EventFileWriter::create(model_dir, "fake.0").unwrap();
    writer.add_scalar(TRAIN_L1_LOSS, value * 2.0, 100).unwrap();
    writer.add_scalar(TRAIN_L1_LOSS, value, 200).unwrap();
    writer.flush().unwrap();
}

fn inputs() -> (tempfile::TempDir, RunConfig) {
    let dir = tempfile::tempdir().unwrap();
    for name in ["scene", "depths", "gt"] {
        std::fs::create_dir(dir.path().join(name)).unwrap();
    }
    let config = RunConfig::new(
        dir.path().join("scene"),
        dir.path().join("depths"),
        dir.path().join("gt"),
        dir.path().join("out"),
    );
    (dir, config)
}

fn launched_modes(calls: &[Call]) -> Vec<SupervisionMode> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::Launch(mode, _) => Some(*mode),
            Call::Terminate(_) => None,
        })
        .collect()
}

fn terminated_modes(calls: &[Call]) -> Vec<SupervisionMode> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::Terminate(mode) => Some(*mode),
            Call::Launch(..) => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Test: input validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_scene_launches_nothing() {
    let (dir, mut config) = inputs();
    config.scene = dir.path().join("missing_scene");

    let launcher = FakeLauncher::new(Behaviour::Finish(0.5, 0), Behaviour::Finish(0.4, 0));
    let calls = Arc::clone(&launcher.calls);
    let orchestrator = Orchestrator::new(launcher);

    let mut out = Vec::new();
    let err = orchestrator
        .run(&config, &mut out, CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, OrchestratorError::MissingInput { what: "Scene path", .. });
    assert!(calls.lock().unwrap().is_empty());
    assert!(!config.output_base.exists());
    assert!(out.is_empty());
}

// ---------------------------------------------------------------------------
// Test: full run
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completed_run_compares_both_outputs() {
    let (_dir, config) = inputs();
    let launcher = FakeLauncher::new(Behaviour::Finish(0.5, 0), Behaviour::Finish(0.25, 3));
    let calls = Arc::clone(&launcher.calls);
    let orchestrator = Orchestrator::new(launcher);

    let mut out = Vec::new();
    let outcome = orchestrator
        .run(&config, &mut out, CancellationToken::new())
        .await
        .unwrap();

    let (weak, strong, comparison) = assert_matches!(
        outcome,
        RunOutcome::Completed { weak, strong, comparison } => (weak, strong, comparison)
    );
    assert_eq!(weak.exit_code, 0);
    assert_eq!(strong.exit_code, 3);

    let summary_path = assert_matches!(
        &comparison,
        ComparisonOutcome::Completed { summary_path, .. } => summary_path.clone()
    );
    assert_eq!(
        summary_path,
        config.output_base.join(COMPARISON_DIR).join("comparison_summary.json")
    );
    let l1 = comparison.record().unwrap().comparison(TRAIN_L1_LOSS).unwrap();
    assert_eq!(l1.absolute_improvement, -0.25);
    assert!(l1.strong_better);

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        launched_modes(&calls),
        vec![SupervisionMode::Weak, SupervisionMode::Strong]
    );
    assert!(terminated_modes(&calls).is_empty());

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("STARTING COMPARATIVE TRAINING"));
    assert!(text.contains("Weak supervision PID: 1001"));
    assert!(text.contains("Strong supervision PID: 1002"));
    assert!(text.contains("tensorboard --logdir"));
    assert!(text.contains("Strong supervision exit code: 3"));
    assert!(text.contains("TRAINING COMPARISON SUMMARY"));
}

#[tokio::test]
async fn strong_run_receives_gt_depth_arguments() {
    let (_dir, mut config) = inputs();
    config.strong.depth_weight = 4.0;
    let launcher = FakeLauncher::new(Behaviour::Finish(0.5, 0), Behaviour::Finish(0.4, 0));
    let calls = Arc::clone(&launcher.calls);

    Orchestrator::new(launcher)
        .run(&config, &mut Vec::new(), CancellationToken::new())
        .await
        .unwrap();

    let calls = calls.lock().unwrap().clone();
    let strong_args = calls
        .iter()
        .find_map(|c| match c {
            Call::Launch(SupervisionMode::Strong, args) => Some(args.clone()),
            _ => None,
        })
        .unwrap();
    let weight_at = strong_args.iter().position(|a| a == "--depth_weight").unwrap();
    assert_eq!(strong_args[weight_at + 1], "4");
    assert!(strong_args.contains(&config.gt_depth().display().to_string()));
    assert!(!strong_args.contains(&"-d".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn comparison_report_follows_training_output() {
    let (_dir, config) = inputs();
    let launcher = FakeLauncher::new(Behaviour::Finish(0.5, 0), Behaviour::Finish(0.25, 0));

    let mut out = Vec::new();
    let outcome = Orchestrator::new(launcher)
        .run(&config, &mut out, CancellationToken::new())
        .await
        .unwrap();
    assert_matches!(outcome, RunOutcome::Completed { .. });

    let text = String::from_utf8(out).unwrap();
    let position = |needle: &str| text.find(needle).unwrap();
    assert!(position("Training completed!") < position("Running automatic comparison..."));
    assert!(position("Running automatic comparison...") < position("Extracting tensorboard data..."));
    assert!(position("Extracting tensorboard data...") < position("TRAINING COMPARISON SUMMARY"));
    assert!(text.trim_end().ends_with("Check the output directory for results."));
}

#[tokio::test]
async fn comparison_failure_keeps_partial_report() {
    let (_dir, config) = inputs();
    std::fs::create_dir_all(&config.output_base).unwrap();
    std::fs::write(config.output_base.join(COMPARISON_DIR), "not a directory").unwrap();
    let launcher = FakeLauncher::new(Behaviour::Finish(0.5, 0), Behaviour::Finish(0.25, 0));

    let mut out = Vec::new();
    let err = Orchestrator::new(launcher)
        .run(&config, &mut out, CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(err, OrchestratorError::Compare(CompareError::Io { .. }));
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Extracting tensorboard data..."));
    assert!(!text.contains("TRAINING COMPARISON SUMMARY"));
}

// ---------------------------------------------------------------------------
// Test: cancellation and launch failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancellation_terminates_both_trainers() {
    let (_dir, config) = inputs();
    let launcher = FakeLauncher::new(Behaviour::Hang, Behaviour::Hang);
    let calls = Arc::clone(&launcher.calls);
    let orchestrator = Orchestrator::new(launcher);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let mut out = Vec::new();
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.run(&config, &mut out, cancel),
    )
    .await
    .unwrap()
    .unwrap();

    assert_matches!(outcome, RunOutcome::Interrupted);

    let mut terminated = terminated_modes(&calls.lock().unwrap());
    terminated.sort_by_key(|m| m.as_str());
    assert_eq!(
        terminated,
        vec![SupervisionMode::Strong, SupervisionMode::Weak]
    );

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Training interrupted by user."));
    assert!(!text.contains("Running automatic comparison"));
    assert!(!config.output_base.join(COMPARISON_DIR).exists());
}

#[tokio::test]
async fn failed_strong_launch_stops_weak_run() {
    let (_dir, config) = inputs();
    let launcher = FakeLauncher::new(Behaviour::Hang, Behaviour::FailToStart);
    let calls = Arc::clone(&launcher.calls);

    let err = Orchestrator::new(launcher)
        .run(&config, &mut Vec::new(), CancellationToken::new())
        .await
        .unwrap_err();

    assert_matches!(
        err,
        OrchestratorError::Trainer(TrainerError::Spawn { mode: "strong", .. })
    );
    let calls = calls.lock().unwrap().clone();
    assert_eq!(launched_modes(&calls), vec![SupervisionMode::Weak]);
    assert_eq!(terminated_modes(&calls), vec![SupervisionMode::Weak]);
}
