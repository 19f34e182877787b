use std::path::PathBuf;

use depthcmp_compare::CompareError;
use depthcmp_core::error::TrainerError;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("{what} does not exist: {}", path.display())]
    MissingInput { what: &'static str, path: PathBuf },

    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Trainer(#[from] TrainerError),

    #[error(transparent)]
    Compare(#[from] CompareError),

    #[error("Comparison task failed: {0}")]
    ComparisonTask(#[source] tokio::task::JoinError),

    #[error("Failed to write run output: {0}")]
    Output(#[from] std::io::Error),
}
