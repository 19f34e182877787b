//! Contract checks against [`DepthSupervisionArgs`] and the trainer tree.

use std::fmt::{Debug, Display};
use std::path::Path;

use depthcmp_core::trainer::DepthSupervisionArgs;

/// Every depth option set to a non-default value.
pub const OVERRIDE_ARGS: [&str; 18] = [
    "--depth_dir",
    "/path/to/depths",
    "--depth_format",
    "exr",
    "--depth_units",
    "millimeters",
    "--depth_weight",
    "3.0",
    "--depth_loss",
    "l1",
    "--depth_grad_weight",
    "0.2",
    "--depth_warmup",
    "1000",
    "--depth_valid_min",
    "0.1",
    "--depth_valid_max",
    "100.0",
];

/// Trainer files the depth-supervision pipeline touches, relative to the
/// trainer root.
pub const TRAINER_MODULES: [&str; 7] = [
    "train.py",
    "arguments/__init__.py",
    "scene/__init__.py",
    "scene/dataset_readers.py",
    "scene/cameras.py",
    "utils/camera_utils.py",
    "gaussian_renderer/__init__.py",
];

pub const USAGE_EXAMPLE: &str = "\
python train.py -s <scene> -m <output> \\
  --depth_dir /path/to/gt_depths \\
  --depth_format png16 --depth_units meters \\
  --depth_weight 2.0 --depth_loss huber \\
  --depth_warmup 2000 --depth_grad_weight 0.1";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Expected {expected}, got {actual} for {option}")]
pub struct ContractViolation {
    pub option: String,
    pub expected: String,
    pub actual: String,
}

impl ContractViolation {
    pub(crate) fn new(option: impl Into<String>, expected: impl Display, actual: impl Display) -> Self {
        Self {
            option: option.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

pub fn expected_defaults() -> DepthSupervisionArgs {
    DepthSupervisionArgs {
        depth_dir: String::new(),
        depth_format: "png16".to_string(),
        depth_units: "meters".to_string(),
        depth_weight: 2.0,
        depth_loss: "huber".to_string(),
        depth_grad_weight: 0.1,
        depth_warmup: 2000,
        depth_valid_min: 1e-4,
        depth_valid_max: 80.0,
    }
}

pub fn expected_overrides() -> DepthSupervisionArgs {
    DepthSupervisionArgs {
        depth_dir: "/path/to/depths".to_string(),
        depth_format: "exr".to_string(),
        depth_units: "millimeters".to_string(),
        depth_weight: 3.0,
        depth_loss: "l1".to_string(),
        depth_grad_weight: 0.2,
        depth_warmup: 1000,
        depth_valid_min: 0.1,
        depth_valid_max: 100.0,
    }
}

/// Parsing no arguments yields the documented defaults.
pub fn check_defaults() -> Result<DepthSupervisionArgs, ContractViolation> {
    check_parse(&[], &expected_defaults())
}

/// Parsing [`OVERRIDE_ARGS`] sets every option, and only that option.
pub fn check_overrides() -> Result<DepthSupervisionArgs, ContractViolation> {
    check_parse(&OVERRIDE_ARGS, &expected_overrides())
}

/// Every file in [`TRAINER_MODULES`] exists under `root`.
pub fn check_trainer_modules(root: &Path) -> Result<(), ContractViolation> {
    for module in TRAINER_MODULES {
        let path = root.join(module);
        if !path.is_file() {
            return Err(ContractViolation::new(
                module,
                "file present",
                format!("missing {}", path.display()),
            ));
        }
    }
    Ok(())
}

fn check_parse(
    args: &[&str],
    expected: &DepthSupervisionArgs,
) -> Result<DepthSupervisionArgs, ContractViolation> {
    let parsed = DepthSupervisionArgs::try_parse_args(args.iter().copied()).map_err(|e| {
        ContractViolation::new(args.join(" "), "arguments to parse", format!("{:?}", e.kind()))
    })?;
    compare_fields(expected, &parsed)?;
    Ok(parsed)
}

fn field<T: PartialEq + Debug>(
    option: &str,
    expected: &T,
    actual: &T,
) -> Result<(), ContractViolation> {
    if expected == actual {
        Ok(())
    } else {
        Err(ContractViolation::new(
            option,
            format!("{expected:?}"),
            format!("{actual:?}"),
        ))
    }
}

pub(crate) fn compare_fields(
    expected: &DepthSupervisionArgs,
    actual: &DepthSupervisionArgs,
) -> Result<(), ContractViolation> {
    field("depth_dir", &expected.depth_dir, &actual.depth_dir)?;
    field("depth_format", &expected.depth_format, &actual.depth_format)?;
    field("depth_units", &expected.depth_units, &actual.depth_units)?;
    field("depth_weight", &expected.depth_weight, &actual.depth_weight)?;
    field("depth_loss", &expected.depth_loss, &actual.depth_loss)?;
    field(
        "depth_grad_weight",
        &expected.depth_grad_weight,
        &actual.depth_grad_weight,
    )?;
    field("depth_warmup", &expected.depth_warmup, &actual.depth_warmup)?;
    field(
        "depth_valid_min",
        &expected.depth_valid_min,
        &actual.depth_valid_min,
    )?;
    field(
        "depth_valid_max",
        &expected.depth_valid_max,
        &actual.depth_valid_max,
    )
}
