//! Scalar series and snapshots loaded from a training run's event logs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::types::Step;

/// One recorded sample of a scalar metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarPoint {
    pub step: Step,
    pub value: f64,
    /// Seconds since the Unix epoch, as recorded by the writer.
    pub wall_time: f64,
}

/// A named, ordered sequence of scalar samples in recording order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSeries {
    points: Vec<ScalarPoint>,
}

impl MetricSeries {
    pub fn new(points: Vec<ScalarPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ScalarPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn last(&self) -> Option<&ScalarPoint> {
        self.points.last()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// `(step, value)` pairs, the shape the chart renderer consumes.
    pub fn step_values(&self) -> Vec<(f64, f64)> {
        self.points.iter().map(|p| (p.step as f64, p.value)).collect()
    }

    pub(crate) fn push(&mut self, point: ScalarPoint) {
        self.points.push(point);
    }

    /// Drop every sample at or after `step`.
    pub(crate) fn purge_from(&mut self, step: Step) -> usize {
        let before = self.points.len();
        self.points.retain(|p| p.step < step);
        before - self.points.len()
    }
}

/// Every scalar series found in one load of one log directory.
///
/// Snapshots are never updated in place; polling again produces a new one.
#[derive(Debug, Clone, Default)]
pub struct MetricSnapshot {
    source: PathBuf,
    series: BTreeMap<String, MetricSeries>,
}

impl MetricSnapshot {
    pub fn new(source: PathBuf, series: BTreeMap<String, MetricSeries>) -> Self {
        Self { source, series }
    }

    /// The event file this snapshot was selected from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn get(&self, tag: &str) -> Option<&MetricSeries> {
        self.series.get(tag)
    }

    /// The series for `tag`, only when it holds at least one sample.
    pub fn non_empty(&self, tag: &str) -> Option<&MetricSeries> {
        self.series.get(tag).filter(|s| !s.is_empty())
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(MetricSeries::is_empty)
    }
}
