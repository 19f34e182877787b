//! Contract checks run inside the trainer's own Python interpreter.
//!
//! The in-process checks in [`crate::check`] validate the Rust model of the
//! trainer's options. These checks build the trainer's real `ArgumentParser`
//! from its `arguments` package and import the modules depth supervision
//! touches, so drift in the trainer checkout is caught too.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::process::Command;

use depthcmp_core::trainer::DepthSupervisionArgs;

use crate::check::{compare_fields, expected_defaults, expected_overrides, ContractViolation, OVERRIDE_ARGS};

pub const DEFAULT_PYTHON: &str = "python3";

/// Modules the depth-supervision pipeline changed, with the names each must
/// export.
pub const TRAINER_IMPORTS: [(&str, &[&str]); 5] = [
    ("scene", &["Scene"]),
    ("scene.dataset_readers", &["_read_gt_depth", "readColmapSceneInfo"]),
    ("scene.cameras", &["Camera"]),
    ("utils.camera_utils", &["loadCam", "cameraList_from_camInfos"]),
    ("gaussian_renderer", &["render"]),
];

/// Options the trainer's `OptimizationParams` group must register.
pub const DEPTH_OPTIONS: [&str; 9] = [
    "depth_dir",
    "depth_format",
    "depth_units",
    "depth_weight",
    "depth_loss",
    "depth_grad_weight",
    "depth_warmup",
    "depth_valid_min",
    "depth_valid_max",
];

/// Reads the override list and import table from argv, prints one JSON
/// report on stdout. The trainer root is the working directory, which
/// `python -c` puts first on `sys.path`.
const INSPECT_SCRIPT: &str = r#"
import importlib
import json
import sys
from argparse import ArgumentParser

overrides = json.loads(sys.argv[1])
imports = json.loads(sys.argv[2])
report = {"import_errors": {}}

for module, names in imports.items():
    try:
        loaded = importlib.import_module(module)
        for name in names:
            getattr(loaded, name)
    except Exception as e:
        report["import_errors"][module] = f"{type(e).__name__}: {e}"

def depth_options(group, parser, argv):
    opt = group.extract(parser.parse_args(argv))
    return {k: v for k, v in vars(opt).items() if k.startswith("depth_")}

try:
    from arguments import ModelParams, OptimizationParams, PipelineParams
    parser = ArgumentParser(description="GT depth contract check")
    ModelParams(parser)
    op = OptimizationParams(parser)
    PipelineParams(parser)
    report["defaults"] = depth_options(op, parser, [])
    report["overrides"] = depth_options(op, parser, overrides)
except BaseException as e:
    report["parser_error"] = f"{type(e).__name__}: {e}"

print(json.dumps(report))
"#;

#[derive(Debug, thiserror::Error)]
pub enum TrainerCheckError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Exited {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Unreadable report from the trainer: {0}")]
    Report(#[from] serde_json::Error),

    #[error(transparent)]
    Violation(#[from] ContractViolation),
}

#[derive(Debug, Deserialize)]
struct InspectReport {
    #[serde(default)]
    import_errors: BTreeMap<String, String>,
    defaults: Option<Map<String, Value>>,
    overrides: Option<Map<String, Value>>,
    parser_error: Option<String>,
}

/// Depth options as the trainer's parser produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerOptions {
    pub defaults: DepthSupervisionArgs,
    pub overrides: DepthSupervisionArgs,
}

/// A trainer checkout and the interpreter that runs it.
#[derive(Debug, Clone)]
pub struct TrainerCheckout {
    root: PathBuf,
    python: String,
}

impl TrainerCheckout {
    pub fn new(root: impl Into<PathBuf>, python: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            python: python.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Import every module in [`TRAINER_IMPORTS`], then parse no arguments
    /// and [`OVERRIDE_ARGS`] with the trainer's parser and compare both
    /// results against the expected values.
    pub async fn check(&self) -> Result<TrainerOptions, TrainerCheckError> {
        let report = self.inspect().await?;

        if let Some((module, error)) = report.import_errors.into_iter().next() {
            return Err(ContractViolation::new(module, "module to import", error).into());
        }
        if let Some(error) = report.parser_error {
            return Err(
                ContractViolation::new("arguments", "trainer parser to accept the options", error)
                    .into(),
            );
        }

        let defaults = depth_args("defaults", report.defaults)?;
        compare_fields(&expected_defaults(), &defaults)?;
        let overrides = depth_args("overrides", report.overrides)?;
        compare_fields(&expected_overrides(), &overrides)?;

        Ok(TrainerOptions {
            defaults,
            overrides,
        })
    }

    async fn inspect(&self) -> Result<InspectReport, TrainerCheckError> {
        let overrides = serde_json::to_string(&OVERRIDE_ARGS)?;
        let imports: BTreeMap<&str, &[&str]> = TRAINER_IMPORTS.into_iter().collect();
        let imports = serde_json::to_string(&imports)?;

        tracing::debug!(
            root = %self.root.display(),
            python = %self.python,
            "Running trainer parser"
        );

        let output = Command::new(&self.python)
            .arg("-c")
            .arg(INSPECT_SCRIPT)
            .arg(&overrides)
            .arg(&imports)
            .current_dir(&self.root)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| TrainerCheckError::Spawn {
                program: self.python.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(TrainerCheckError::Exited {
                program: self.python.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        // Trainer modules may print on import; the report is the last line.
        let line = stdout.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
        Ok(serde_json::from_str(line)?)
    }
}

fn depth_args(
    case: &str,
    options: Option<Map<String, Value>>,
) -> Result<DepthSupervisionArgs, ContractViolation> {
    let options = options.unwrap_or_default();
    if let Some(missing) = DEPTH_OPTIONS.iter().find(|o| !options.contains_key(**o)) {
        return Err(ContractViolation::new(
            *missing,
            "option registered by OptimizationParams",
            "missing",
        ));
    }
    serde_json::from_value(Value::Object(options)).map_err(|e| {
        ContractViolation::new(format!("{case} depth options"), "values of the expected types", e)
    })
}
