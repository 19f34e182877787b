//! Folds decoded events into per-tag scalar series.
//!
//! Mirrors how TensorBoard's event accumulator handles orphaned data. A
//! trainer that crashed and resumed from a checkpoint re-logs steps it had
//! already written, and the stale points past the restart are purged so
//! every series stays ordered by step.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::series::{MetricSeries, MetricSnapshot, ScalarPoint};
use crate::types::Step;

use super::proto::{Event, SessionStatus};

/// Event files at this version or newer may also mark restarts with a
/// `SessionLog` START event, which purges every series. Out-of-order summary
/// steps purge their own tags at any version, since writers that never emit
/// session logs still resume from checkpoints.
const SESSION_LOG_FILE_VERSION: f64 = 2.0;

#[derive(Debug, Default)]
pub struct ScalarAccumulator {
    series: BTreeMap<String, MetricSeries>,
    file_version: Option<f64>,
    most_recent_step: Option<Step>,
}

impl ScalarAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&mut self, event: &Event) {
        if let Some(version) = event.file_version.as_deref() {
            let parsed = parse_file_version(version);
            if self.file_version.is_some() && self.file_version != parsed {
                tracing::warn!(
                    previous = ?self.file_version,
                    current = ?parsed,
                    "Event file version changed mid-stream",
                );
            }
            self.file_version = parsed;
        }

        self.maybe_purge(event);

        let Some(summary) = &event.summary else {
            return;
        };
        for value in &summary.value {
            if let Some(scalar) = value.scalar() {
                self.series
                    .entry(value.tag.clone())
                    .or_default()
                    .push(ScalarPoint {
                        step: event.step,
                        value: scalar,
                        wall_time: event.wall_time,
                    });
            }
        }
    }

    pub fn into_snapshot(self, source: PathBuf) -> MetricSnapshot {
        MetricSnapshot::new(source, self.series)
    }

    fn maybe_purge(&mut self, event: &Event) {
        let uses_session_log = self
            .file_version
            .is_some_and(|v| v >= SESSION_LOG_FILE_VERSION);
        let restarted = event
            .session_log
            .as_ref()
            .is_some_and(|log| log.status == SessionStatus::Start as i32);

        if uses_session_log && restarted {
            self.purge(event, false);
            self.most_recent_step = Some(event.step);
            return;
        }

        // Headers and session logs carry no real step; only summaries move it.
        if event.summary.is_none() {
            return;
        }
        let out_of_order = self
            .most_recent_step
            .is_some_and(|recent| event.step < recent);
        if out_of_order {
            self.purge(event, true);
        }
        self.most_recent_step = Some(event.step);
    }

    /// Drop points at or after `event.step`, either for the tags in the
    /// event's summary or for every series.
    fn purge(&mut self, event: &Event, by_tags: bool) {
        let mut purged = 0;
        if by_tags {
            let tags = event.summary.iter().flat_map(|s| s.value.iter());
            for value in tags {
                if let Some(series) = self.series.get_mut(&value.tag) {
                    purged += series.purge_from(event.step);
                }
            }
        } else {
            for series in self.series.values_mut() {
                purged += series.purge_from(event.step);
            }
        }

        if purged > 0 {
            tracing::warn!(
                step = event.step,
                purged,
                by_tags,
                "Detected training restart, purged orphaned scalar points",
            );
        }
    }
}

/// `"brain.Event:2"` → `Some(2.0)`.
fn parse_file_version(version: &str) -> Option<f64> {
    version.rsplit(':').next()?.trim().parse().ok()
}
