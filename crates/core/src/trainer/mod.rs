//! The external Gaussian-splatting trainer as an explicit collaborator.
//!
//! Argument construction and the depth-option surface are pure. Process
//! management sits behind the [`launcher::TrainerLauncher`] trait with a
//! `tokio::process` implementation in [`subprocess`].

pub mod args;
pub mod invocation;
pub mod launcher;
pub mod subprocess;

pub use args::DepthSupervisionArgs;
pub use invocation::{
    StrongSupervision, SupervisionMode, TrainerInvocation, TrainerProgram, TEST_ITERATIONS,
    TOTAL_ITERATIONS,
};
pub use launcher::{ExitReport, TrainerLauncher, TrainerProcess};
pub use subprocess::{ChildProcess, ProcessLauncher};
