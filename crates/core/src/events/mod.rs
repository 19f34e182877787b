//! Metric log reader: TensorBoard event files to [`MetricSnapshot`]s.
//!
//! Decoding is behind the `tfevents` feature. [`LogBackend::detect`] is
//! called once at startup and reports whether it is available, so callers
//! branch on a value instead of discovering a missing decoder mid-run.
//!
//! Absence is the normal state early in training: a missing directory, no
//! event files yet, or an unavailable backend all load as `None`.

#[cfg(feature = "tfevents")]
pub mod accumulator;
#[cfg(feature = "tfevents")]
pub mod proto;
#[cfg(feature = "tfevents")]
mod reader;
#[cfg(feature = "tfevents")]
pub mod record;
#[cfg(feature = "tfevents")]
pub mod writer;

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::series::MetricSnapshot;

#[cfg(feature = "tfevents")]
pub use reader::EventFileReader;

/// File name prefix of every event log the trainer's summary writer creates.
pub const EVENT_FILE_PREFIX: &str = "events.out.tfevents.";

/// Substring that marks a file in an event store directory as an event log.
pub const EVENT_STORE_MARKER: &str = "tfevents";

/// The newest event log under `dir` (searched recursively), by mtime.
pub fn find_latest_event_file(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(EVENT_FILE_PREFIX))
        })
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((modified, entry.into_path()))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, path)| path)
}

/// Whether event logs can be decoded in this build.
#[derive(Debug, Clone)]
pub enum LogBackend {
    #[cfg(feature = "tfevents")]
    Available(EventFileReader),
    Unavailable { reason: String },
}

impl LogBackend {
    /// Determine the backend for this build. Logs once if unavailable.
    pub fn detect() -> Self {
        #[cfg(feature = "tfevents")]
        {
            tracing::debug!("TensorBoard event decoding available");
            Self::Available(EventFileReader::new())
        }

        #[cfg(not(feature = "tfevents"))]
        {
            let backend = Self::unavailable("built without the `tfevents` feature");
            if let Self::Unavailable { reason } = &backend {
                tracing::warn!(%reason, "TensorBoard event decoding unavailable -- no metrics will be loaded");
            }
            backend
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable { .. })
    }

    /// Load a snapshot from the newest event store under `dir`.
    pub fn load_latest(&self, dir: &Path) -> Option<MetricSnapshot> {
        match self {
            #[cfg(feature = "tfevents")]
            Self::Available(reader) => reader.load_latest(dir),
            Self::Unavailable { reason } => {
                tracing::debug!(dir = %dir.display(), %reason, "Skipping load, no event backend");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};
    use std::time::{Duration, SystemTime};

    use super::*;

    fn touch(path: &Path, age: Duration) {
        let file = File::create(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn missing_directory_has_no_event_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_latest_event_file(&dir.path().join("nope")).is_none());
    }

    #[test]
    fn ignores_files_without_the_prefix() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("cfg_args"), Duration::ZERO);
        touch(&dir.path().join("notes.tfevents.txt"), Duration::ZERO);
        assert!(find_latest_event_file(dir.path()).is_none());
    }

    #[test]
    fn picks_newest_file_across_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let old_run = dir.path().join("run_a");
        let new_run = dir.path().join("run_b");
        fs::create_dir_all(&old_run).unwrap();
        fs::create_dir_all(&new_run).unwrap();

        touch(
            &old_run.join("events.out.tfevents.1.host"),
            Duration::from_secs(3600),
        );
        let newest = new_run.join("events.out.tfevents.2.host");
        touch(&newest, Duration::from_secs(10));

        assert_eq!(find_latest_event_file(dir.path()), Some(newest));
    }

    #[test]
    fn unavailable_backend_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LogBackend::unavailable("test");
        assert!(!backend.is_available());
        assert!(backend.load_latest(dir.path()).is_none());
    }

    #[cfg(feature = "tfevents")]
    #[test]
    fn detect_reports_available() {
        assert!(LogBackend::detect().is_available());
    }
}
