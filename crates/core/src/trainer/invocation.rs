//! Argument lists for the two supervision regimes.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Iterations at which the trainer evaluates and logs test metrics.
pub const TEST_ITERATIONS: [u32; 10] = [
    500, 1000, 2000, 3000, 5000, 7000, 10000, 15000, 20000, 30000,
];

/// Total optimisation iterations per run.
pub const TOTAL_ITERATIONS: u32 = 30000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisionMode {
    /// Estimated depth images as a soft signal.
    Weak,
    /// Ground-truth depth maps with an explicit loss.
    Strong,
}

impl SupervisionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Strong => "strong",
        }
    }

    /// Sub-directory of the output base this mode's run writes to.
    pub fn output_dir_name(self) -> &'static str {
        match self {
            Self::Weak => "weak_supervision",
            Self::Strong => "strong_supervision",
        }
    }
}

impl fmt::Display for SupervisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hyper-parameters passed to the strong-supervision run.
#[derive(Debug, Clone, PartialEq)]
pub struct StrongSupervision {
    pub depth_dir: PathBuf,
    pub depth_format: String,
    pub depth_units: String,
    pub depth_weight: f64,
    pub depth_loss: String,
    pub depth_grad_weight: f64,
    pub depth_warmup: u32,
}

impl StrongSupervision {
    pub const DEFAULT_WEIGHT: f64 = 3.5;
    pub const DEFAULT_GRAD_WEIGHT: f64 = 0.2;
    pub const DEFAULT_WARMUP: u32 = 1500;

    pub fn new(depth_dir: impl Into<PathBuf>) -> Self {
        Self {
            depth_dir: depth_dir.into(),
            depth_format: "png16".to_string(),
            depth_units: "meters".to_string(),
            depth_weight: Self::DEFAULT_WEIGHT,
            depth_loss: "huber".to_string(),
            depth_grad_weight: Self::DEFAULT_GRAD_WEIGHT,
            depth_warmup: Self::DEFAULT_WARMUP,
        }
    }

    fn to_args(&self) -> Vec<String> {
        vec![
            "--depth_dir".into(),
            self.depth_dir.display().to_string(),
            "--depth_format".into(),
            self.depth_format.clone(),
            "--depth_units".into(),
            self.depth_units.clone(),
            "--depth_weight".into(),
            self.depth_weight.to_string(),
            "--depth_loss".into(),
            self.depth_loss.clone(),
            "--depth_grad_weight".into(),
            self.depth_grad_weight.to_string(),
            "--depth_warmup".into(),
            self.depth_warmup.to_string(),
        ]
    }
}

/// How to start the trainer: `<interpreter> <script> <args…>`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerProgram {
    pub interpreter: String,
    pub script: PathBuf,
    /// Working directory for the child (inherits ours if `None`).
    pub working_dir: Option<PathBuf>,
}

impl Default for TrainerProgram {
    fn default() -> Self {
        Self {
            interpreter: "python".to_string(),
            script: PathBuf::from("train.py"),
            working_dir: None,
        }
    }
}

impl fmt::Display for TrainerProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.interpreter, self.script.display())
    }
}

/// One fully-specified trainer run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerInvocation {
    mode: SupervisionMode,
    model_dir: PathBuf,
    args: Vec<String>,
}

impl TrainerInvocation {
    /// `-s <scene> -d <depth_images> -m <base>/weak_supervision …`
    pub fn weak(scene: &Path, depth_images: &Path, output_base: &Path) -> Self {
        let model_dir = output_base.join(SupervisionMode::Weak.output_dir_name());
        let mut args = vec![
            "-s".to_string(),
            scene.display().to_string(),
            "-d".to_string(),
            depth_images.display().to_string(),
        ];
        args.extend(schedule_args(&model_dir));
        Self {
            mode: SupervisionMode::Weak,
            model_dir,
            args,
        }
    }

    /// `-s <scene> --depth_dir <gt> … -m <base>/strong_supervision …`
    pub fn strong(scene: &Path, supervision: &StrongSupervision, output_base: &Path) -> Self {
        let model_dir = output_base.join(SupervisionMode::Strong.output_dir_name());
        let mut args = vec!["-s".to_string(), scene.display().to_string()];
        args.extend(supervision.to_args());
        args.extend(schedule_args(&model_dir));
        Self {
            mode: SupervisionMode::Strong,
            model_dir,
            args,
        }
    }

    pub fn mode(&self) -> SupervisionMode {
        self.mode
    }

    /// Directory the trainer writes its model and event logs to.
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Printable command line, for logs and banners.
    pub fn command_line(&self, program: &TrainerProgram) -> String {
        let mut parts = vec![program.to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// `-m <model_dir> --test_iterations … --iterations <total>`
fn schedule_args(model_dir: &Path) -> Vec<String> {
    let mut args = vec![
        "-m".to_string(),
        model_dir.display().to_string(),
        "--test_iterations".to_string(),
    ];
    args.extend(TEST_ITERATIONS.iter().map(u32::to_string));
    args.push("--iterations".to_string());
    args.push(TOTAL_ITERATIONS.to_string());
    args
}
