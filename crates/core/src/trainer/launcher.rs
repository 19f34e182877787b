//! Interface to the external trainer process.
//!
//! [`TrainerLauncher`] turns a [`TrainerInvocation`] into a running
//! [`TrainerProcess`]. The orchestrator only talks to these traits, so it
//! can be driven by a fake in tests and by
//! [`ProcessLauncher`](super::subprocess::ProcessLauncher) for real runs.

use std::future::Future;

use serde::Serialize;

use crate::error::TrainerError;

use super::invocation::{SupervisionMode, TrainerInvocation};

/// How a trainer run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExitReport {
    pub mode: SupervisionMode,
    /// Process exit code (`-1` if killed by signal).
    pub exit_code: i32,
}

impl ExitReport {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Starts trainer runs.
pub trait TrainerLauncher: Send + Sync {
    type Process: TrainerProcess;

    /// Start `invocation` without waiting for it.
    fn launch(&self, invocation: &TrainerInvocation) -> Result<Self::Process, TrainerError>;
}

/// A running trainer.
pub trait TrainerProcess: Send {
    fn mode(&self) -> SupervisionMode;

    /// OS process id, if the process is still known to the OS.
    fn id(&self) -> Option<u32>;

    /// Wait for the run to finish on its own.
    fn wait(&mut self) -> impl Future<Output = Result<ExitReport, TrainerError>> + Send;

    /// Ask the run to stop and wait until it has.
    fn terminate(&mut self) -> impl Future<Output = Result<ExitReport, TrainerError>> + Send;
}
