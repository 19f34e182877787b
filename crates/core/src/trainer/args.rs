//! The external trainer's depth-supervision options.
//!
//! Mirrors the option group `train.py` registers for ground-truth depth
//! supervision, so both the contract check and the orchestrator can parse
//! exactly what the trainer would. Long flags keep the trainer's
//! underscore spelling, and so do the field names the trainer reports when
//! its own parser is run.

use clap::Parser;

#[derive(Debug, Clone, PartialEq, clap::Args, serde::Deserialize)]
pub struct DepthSupervisionArgs {
    /// Directory of ground-truth depth maps. Empty disables depth supervision.
    #[arg(long = "depth_dir", default_value = "")]
    pub depth_dir: String,

    /// On-disk encoding of the depth maps (e.g. `png16`, `exr`).
    #[arg(long = "depth_format", default_value = "png16")]
    pub depth_format: String,

    /// Physical units of stored depth values (e.g. `meters`, `millimeters`).
    #[arg(long = "depth_units", default_value = "meters")]
    pub depth_units: String,

    /// Weight of the depth loss term.
    #[arg(long = "depth_weight", default_value_t = 2.0)]
    pub depth_weight: f64,

    /// Robust loss applied to depth residuals (e.g. `huber`, `l1`).
    #[arg(long = "depth_loss", default_value = "huber")]
    pub depth_loss: String,

    /// Weight of the depth-gradient term.
    #[arg(long = "depth_grad_weight", default_value_t = 0.1)]
    pub depth_grad_weight: f64,

    /// Iterations before depth supervision reaches full weight.
    #[arg(long = "depth_warmup", default_value_t = 2000)]
    pub depth_warmup: u32,

    /// Depths below this are treated as invalid.
    #[arg(long = "depth_valid_min", default_value_t = 1e-4)]
    pub depth_valid_min: f64,

    /// Depths above this are treated as invalid.
    #[arg(long = "depth_valid_max", default_value_t = 80.0)]
    pub depth_valid_max: f64,
}

/// Stand-alone parser around [`DepthSupervisionArgs`].
#[derive(Debug, Parser)]
#[command(name = "train.py", about = "Depth supervision options of the trainer")]
pub struct DepthSupervisionCli {
    #[command(flatten)]
    pub depth: DepthSupervisionArgs,
}

impl DepthSupervisionArgs {
    /// Parse trainer-style arguments (without the program name).
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let argv = std::iter::once(std::ffi::OsString::from("train.py"))
            .chain(args.into_iter().map(Into::into));
        DepthSupervisionCli::try_parse_from(argv).map(|cli| cli.depth)
    }
}
