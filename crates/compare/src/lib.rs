//! `depthcmp-compare` -- compare a weak and a strong supervision run after
//! training has finished.
//!
//! Loads the latest event logs from both model directories, summarises each
//! compared metric, and writes `comparison_summary.json` plus a
//! `training_comparison.png` chart into the output directory.

pub mod chart;
pub mod comparator;
pub mod error;
pub mod report;

pub use comparator::{Comparator, ComparisonOutcome, CHART_FILE, SUMMARY_FILE};
pub use error::CompareError;
