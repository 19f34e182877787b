use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to serialize comparison summary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render chart: {0}")]
    Chart(String),
}

impl CompareError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
