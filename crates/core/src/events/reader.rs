//! Locates and loads a training run's TensorBoard event logs.

use std::path::{Path, PathBuf};

use prost::Message;

use crate::error::EventLogError;
use crate::series::MetricSnapshot;

use super::accumulator::ScalarAccumulator;
use super::proto::Event;
use super::record::RecordReader;
use super::{find_latest_event_file, EVENT_STORE_MARKER};

/// Reads scalar series out of TensorBoard event files.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFileReader;

impl EventFileReader {
    pub fn new() -> Self {
        Self
    }

    /// Load every scalar series from the store holding the newest event
    /// file under `dir`.
    ///
    /// Returns `None` when no event file exists yet. A missing directory
    /// counts as "no event file".
    pub fn load_latest(&self, dir: &Path) -> Option<MetricSnapshot> {
        let Some(latest) = find_latest_event_file(dir) else {
            tracing::info!(dir = %dir.display(), "No tensorboard files found");
            return None;
        };

        tracing::info!(file = %latest.display(), "Loading tensorboard data");

        let store = latest.parent().unwrap_or(dir).to_path_buf();
        Some(self.load_store(&store, latest))
    }

    /// Load every event file directly inside `store`, in filename order.
    pub fn load_store(&self, store: &Path, source: PathBuf) -> MetricSnapshot {
        let mut accumulator = ScalarAccumulator::new();

        for file in store_files(store) {
            if let Err(e) = self.read_file(&file, &mut accumulator) {
                tracing::warn!(file = %file.display(), error = %e, "Skipping unreadable event file");
            }
        }

        accumulator.into_snapshot(source)
    }

    /// Decode `path` into `accumulator`.
    ///
    /// Undecodable records are skipped. A checksum failure stops reading
    /// this file but keeps what was read before it.
    fn read_file(
        &self,
        path: &Path,
        accumulator: &mut ScalarAccumulator,
    ) -> Result<(), EventLogError> {
        let bytes = std::fs::read(path).map_err(|source| EventLogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut records = RecordReader::new(&bytes);
        let mut decoded = 0usize;
        loop {
            let offset = records.offset();
            let Some(record) = records.next() else {
                break;
            };
            let payload = match record {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "Event file is corrupt, keeping records read so far");
                    break;
                }
            };
            match Event::decode(payload) {
                Ok(event) => {
                    accumulator.add_event(&event);
                    decoded += 1;
                }
                Err(e) => {
                    let e = EventLogError::Decode {
                        offset,
                        message: e.to_string(),
                    };
                    tracing::warn!(file = %path.display(), error = %e, "Skipping undecodable event");
                }
            }
        }

        tracing::debug!(file = %path.display(), decoded, "Read event file");
        Ok(())
    }
}

/// Event files directly inside `store`, sorted by name.
fn store_files(store: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(store) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %store.display(), error = %e, "Failed to list event store");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.contains(EVENT_STORE_MARKER))
        })
        .map(|entry| entry.path())
        .collect();
    files.sort();
    files
}
