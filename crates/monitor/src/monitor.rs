//! Poll loop driving the live progress view.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use depthcmp_core::events::LogBackend;
use depthcmp_core::series::MetricSnapshot;
use depthcmp_core::types::Timestamp;

use crate::progress::{latest_metrics, print_progress, print_waiting, LatestMetric};

pub const DEFAULT_REFRESH: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No monitored metric has been recorded yet, or the log disappeared.
    Waiting,
    MetricsFound,
    Stopped,
}

pub struct Monitor {
    backend: LogBackend,
    model_dir: PathBuf,
    refresh: Duration,
    state: MonitorState,
}

impl Monitor {
    pub fn new(backend: LogBackend, model_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            model_dir: model_dir.into(),
            refresh: DEFAULT_REFRESH,
            state: MonitorState::Waiting,
        }
    }

    pub fn with_refresh(mut self, refresh: Duration) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Load the newest snapshot off the async runtime.
    async fn load(&self) -> Option<MetricSnapshot> {
        let backend = self.backend.clone();
        let dir = self.model_dir.clone();
        match tokio::task::spawn_blocking(move || backend.load_latest(&dir)).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(error = %e, "Metric load task failed");
                None
            }
        }
    }

    /// Run one poll and print its result. Returns the latest values shown.
    pub async fn tick<W: Write>(&mut self, out: &mut W) -> io::Result<Vec<LatestMetric>> {
        let latest = self
            .load()
            .await
            .map(|snapshot| latest_metrics(&snapshot))
            .unwrap_or_default();

        let now: Timestamp = Local::now();
        let next = if latest.is_empty() {
            print_waiting(out, &now)?;
            MonitorState::Waiting
        } else {
            print_progress(out, &now, &latest)?;
            MonitorState::MetricsFound
        };
        out.flush()?;

        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "Monitor state changed");
        }
        self.state = next;
        Ok(latest)
    }

    /// Poll every refresh interval until `cancel` fires.
    pub async fn run<W: Write>(&mut self, out: &mut W, cancel: CancellationToken) -> io::Result<()> {
        tracing::info!(
            dir = %self.model_dir.display(),
            refresh_secs = self.refresh.as_secs(),
            "Monitor started"
        );

        let mut interval = poll_interval(self.refresh);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Monitor stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.tick(out).await?;
                }
            }
        }

        self.state = MonitorState::Stopped;
        writeln!(out)?;
        writeln!(out, "Monitoring stopped by user.")?;
        out.flush()
    }
}

/// A slow load pushes the next poll back instead of firing the missed ones
/// back to back.
fn poll_interval(refresh: Duration) -> Interval {
    let mut interval = tokio::time::interval(refresh);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}
