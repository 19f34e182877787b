//! Summary statistics and weak-vs-strong comparison (pure logic).
//!
//! No file I/O here. The comparator loads the snapshots and writes the
//! resulting [`ComparisonRecord`]; this module only derives it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metric_names::higher_is_better;
use crate::series::MetricSnapshot;

/// Per-series statistics over every recorded value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub final_value: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub mean_value: f64,
    /// Population standard deviation (divides by `n`, not `n - 1`).
    pub std_value: f64,
    /// Number of recorded samples.
    pub total_iterations: usize,
}

impl SeriesSummary {
    /// Summarise `values`, or `None` when there is nothing to summarise.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let final_value = *values.last()?;
        let n = values.len() as f64;

        let min_value = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean_value = values.iter().sum::<f64>() / n;
        let variance = values
            .iter()
            .map(|v| (v - mean_value).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            final_value,
            min_value,
            max_value,
            mean_value,
            std_value: variance.sqrt(),
            total_iterations: values.len(),
        })
    }
}

/// How the strong run's final value compares to the weak run's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    /// `strong.final - weak.final`.
    pub absolute_improvement: f64,
    /// Absolute improvement as a percentage of the weak final value.
    /// Reported as `0` when the weak final value is exactly zero.
    pub relative_improvement_percent: f64,
    pub strong_better: bool,
}

impl MetricComparison {
    pub fn between(tag: &str, weak_final: f64, strong_final: f64) -> Self {
        let absolute_improvement = strong_final - weak_final;
        let relative_improvement_percent = if weak_final != 0.0 {
            absolute_improvement / weak_final * 100.0
        } else {
            0.0
        };
        let strong_better = if higher_is_better(tag) {
            absolute_improvement > 0.0
        } else {
            absolute_improvement < 0.0
        };

        Self {
            absolute_improvement,
            relative_improvement_percent,
            strong_better,
        }
    }
}

/// A per-metric slot that serializes to `{}` when nothing was computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricEntry<T> {
    Recorded(T),
    Missing {},
}

impl<T> MetricEntry<T> {
    pub fn recorded(&self) -> Option<&T> {
        match self {
            Self::Recorded(value) => Some(value),
            Self::Missing {} => None,
        }
    }
}

impl<T> From<Option<T>> for MetricEntry<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing {}, Self::Recorded)
    }
}

/// Weak summaries, strong summaries and comparisons for a fixed metric list.
///
/// Every listed metric has a key in all three maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub weak_supervision: BTreeMap<String, MetricEntry<SeriesSummary>>,
    pub strong_supervision: BTreeMap<String, MetricEntry<SeriesSummary>>,
    pub comparison: BTreeMap<String, MetricEntry<MetricComparison>>,
    /// Metric order used for reporting.
    #[serde(skip)]
    order: Vec<String>,
}

impl ComparisonRecord {
    /// Derive the record for `metrics` from the two (possibly absent) snapshots.
    pub fn build(
        metrics: &[&str],
        weak: Option<&MetricSnapshot>,
        strong: Option<&MetricSnapshot>,
    ) -> Self {
        let mut record = Self::default();

        for &tag in metrics {
            let weak_values = weak.and_then(|s| s.non_empty(tag)).map(|s| s.values());
            let strong_values = strong.and_then(|s| s.non_empty(tag)).map(|s| s.values());

            let weak_summary = weak_values.as_deref().and_then(SeriesSummary::from_values);
            let strong_summary = strong_values
                .as_deref()
                .and_then(SeriesSummary::from_values);

            let comparison = match (&weak_summary, &strong_summary) {
                (Some(w), Some(s)) => Some(MetricComparison::between(
                    tag,
                    w.final_value,
                    s.final_value,
                )),
                _ => None,
            };

            record
                .weak_supervision
                .insert(tag.to_string(), weak_summary.into());
            record
                .strong_supervision
                .insert(tag.to_string(), strong_summary.into());
            record
                .comparison
                .insert(tag.to_string(), comparison.into());
            record.order.push(tag.to_string());
        }

        record
    }

    pub fn weak(&self, tag: &str) -> Option<&SeriesSummary> {
        self.weak_supervision.get(tag).and_then(MetricEntry::recorded)
    }

    pub fn strong(&self, tag: &str) -> Option<&SeriesSummary> {
        self.strong_supervision
            .get(tag)
            .and_then(MetricEntry::recorded)
    }

    pub fn comparison(&self, tag: &str) -> Option<&MetricComparison> {
        self.comparison.get(tag).and_then(MetricEntry::recorded)
    }

    /// Metrics that have a comparison entry, in report order.
    pub fn compared(&self) -> Vec<(&str, &MetricComparison)> {
        let tags: Vec<&str> = if self.order.is_empty() {
            self.comparison.keys().map(String::as_str).collect()
        } else {
            self.order.iter().map(String::as_str).collect()
        };

        tags.into_iter()
            .filter_map(|tag| self.comparison(tag).map(|c| (tag, c)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
