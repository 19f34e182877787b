//! Post-hoc comparison of a weak and a strong supervision run.

use std::io::Write;
use std::path::{Path, PathBuf};

use depthcmp_core::events::LogBackend;
use depthcmp_core::metric_names::{ComparedMetric, COMPARED_METRICS};
use depthcmp_core::series::MetricSnapshot;
use depthcmp_core::stats::ComparisonRecord;

use crate::chart::render_chart;
use crate::error::CompareError;
use crate::report::{print_summary, write_summary_json};

pub const SUMMARY_FILE: &str = "comparison_summary.json";
pub const CHART_FILE: &str = "training_comparison.png";

/// Result of one comparison pass.
#[derive(Debug)]
pub enum ComparisonOutcome {
    /// Neither run had any metrics. Nothing was written.
    NoData,
    Completed {
        record: ComparisonRecord,
        summary_path: PathBuf,
        /// `None` when chart rendering failed. The summary is still valid.
        chart_path: Option<PathBuf>,
    },
}

impl ComparisonOutcome {
    pub fn record(&self) -> Option<&ComparisonRecord> {
        match self {
            Self::NoData => None,
            Self::Completed { record, .. } => Some(record),
        }
    }
}

pub struct Comparator {
    backend: LogBackend,
    metrics: Vec<ComparedMetric>,
}

impl Comparator {
    pub fn new(backend: LogBackend) -> Self {
        Self::with_metrics(backend, COMPARED_METRICS.to_vec())
    }

    pub fn with_metrics(backend: LogBackend, metrics: Vec<ComparedMetric>) -> Self {
        Self { backend, metrics }
    }

    pub fn metrics(&self) -> &[ComparedMetric] {
        &self.metrics
    }

    fn load(&self, dir: &Path) -> Option<MetricSnapshot> {
        self.backend.load_latest(dir).filter(|s| !s.is_empty())
    }

    /// Load both runs, write the JSON summary and chart into `output_dir`,
    /// and print the summary table to `out`.
    pub fn compare<W: Write>(
        &self,
        weak_dir: &Path,
        strong_dir: &Path,
        output_dir: &Path,
        out: &mut W,
    ) -> Result<ComparisonOutcome, CompareError> {
        writeln!(out, "Extracting tensorboard data...")?;
        let weak = self.load(weak_dir);
        let strong = self.load(strong_dir);

        if weak.is_none() && strong.is_none() {
            writeln!(out, "No tensorboard data found in either directory!")?;
            tracing::warn!(
                weak = %weak_dir.display(),
                strong = %strong_dir.display(),
                "No metrics found for either run"
            );
            return Ok(ComparisonOutcome::NoData);
        }

        std::fs::create_dir_all(output_dir).map_err(CompareError::io(output_dir))?;

        writeln!(out, "Computing statistics...")?;
        let tags: Vec<&str> = self.metrics.iter().map(|m| m.tag).collect();
        let record = ComparisonRecord::build(&tags, weak.as_ref(), strong.as_ref());

        let summary_path = output_dir.join(SUMMARY_FILE);
        write_summary_json(&record, &summary_path)?;
        print_summary(out, &record, &summary_path)?;

        writeln!(out, "Generating comparison plots...")?;
        let chart_path = output_dir.join(CHART_FILE);
        let chart_path = match render_chart(&chart_path, &self.metrics, weak.as_ref(), strong.as_ref()) {
            Ok(()) => {
                writeln!(out, "Comparison plot saved to: {}", chart_path.display())?;
                Some(chart_path)
            }
            Err(e) => {
                tracing::error!(error = %e, path = %chart_path.display(), "Chart rendering failed");
                None
            }
        };

        writeln!(out)?;
        writeln!(
            out,
            "Comparison complete! Check the output directory for results."
        )?;

        tracing::info!(
            summary = %summary_path.display(),
            compared = record.compared().len(),
            "Comparison finished"
        );

        Ok(ComparisonOutcome::Completed {
            record,
            summary_path,
            chart_path,
        })
    }
}
