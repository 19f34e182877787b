//! `depthcmp-monitor` -- live progress view of a single training run.
//!
//! Polls the run's event logs on a fixed interval and prints the latest
//! value of a few key metrics until cancelled.

pub mod monitor;
pub mod progress;

pub use monitor::{Monitor, MonitorState, DEFAULT_REFRESH};
pub use progress::{latest_metrics, LatestMetric};
