//! `depthcmp-orchestrator` -- run the weak and strong supervision trainers
//! side by side, then compare them.

pub mod config;
pub mod error;
pub mod orchestrator;

pub use config::RunConfig;
pub use error::OrchestratorError;
pub use orchestrator::{Orchestrator, RunOutcome, COMPARISON_DIR};
