//! Latest-value extraction and the printed progress block.

use std::io::{self, Write};

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use depthcmp_core::metric_names::{display_name, MONITORED_TAGS};
use depthcmp_core::series::MetricSnapshot;
use depthcmp_core::types::Step;

const RULE_WIDTH: usize = 60;

/// Most recent sample of one monitored tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestMetric {
    pub tag: String,
    pub latest_step: Step,
    pub latest_value: f64,
    pub total_points: usize,
}

/// Latest values for the monitored tags present in `snapshot`, in
/// monitoring order. Tags with no samples are left out.
pub fn latest_metrics(snapshot: &MetricSnapshot) -> Vec<LatestMetric> {
    MONITORED_TAGS
        .iter()
        .filter_map(|&tag| {
            let series = snapshot.non_empty(tag)?;
            let last = series.last()?;
            Some(LatestMetric {
                tag: tag.to_string(),
                latest_step: last.step,
                latest_value: last.value,
                total_points: series.len(),
            })
        })
        .collect()
}

pub fn print_progress<W: Write, Tz: TimeZone>(
    out: &mut W,
    at: &DateTime<Tz>,
    metrics: &[LatestMetric],
) -> io::Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "Training Progress - {}", at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "{rule}")?;
    for m in metrics {
        writeln!(
            out,
            "{:<20}: {:.6} (iter {})",
            display_name(&m.tag),
            m.latest_value,
            m.latest_step
        )?;
    }
    writeln!(out, "{rule}")
}

pub fn print_waiting<W: Write, Tz: TimeZone>(out: &mut W, at: &DateTime<Tz>) -> io::Result<()>
where
    Tz::Offset: std::fmt::Display,
{
    writeln!(
        out,
        "No metrics found at {} - training may not have started yet...",
        at.format("%H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use chrono::{NaiveDate, Utc};
    use depthcmp_core::metric_names::{TEST_PSNR, TRAIN_L1_LOSS, TRAIN_TOTAL_LOSS, VALIDATION_PSNR};
    use depthcmp_core::series::{MetricSeries, ScalarPoint};

    use super::*;

    fn series(points: &[(i64, f64)]) -> MetricSeries {
        MetricSeries::new(
            points
                .iter()
                .map(|&(step, value)| ScalarPoint {
                    step,
                    value,
                    wall_time: 0.0,
                })
                .collect(),
        )
    }

    fn at() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn keeps_only_monitored_non_empty_tags_in_order() {
        let mut map = BTreeMap::new();
        map.insert(TEST_PSNR.to_string(), series(&[(7000, 24.5)]));
        map.insert(TRAIN_TOTAL_LOSS.to_string(), series(&[(10, 0.3), (20, 0.2)]));
        map.insert(TRAIN_L1_LOSS.to_string(), series(&[]));
        map.insert(VALIDATION_PSNR.to_string(), series(&[(7000, 22.0)]));
        let snapshot = MetricSnapshot::new(PathBuf::from("e"), map);

        let latest = latest_metrics(&snapshot);

        assert_eq!(
            latest,
            vec![
                LatestMetric {
                    tag: TRAIN_TOTAL_LOSS.to_string(),
                    latest_step: 20,
                    latest_value: 0.2,
                    total_points: 2,
                },
                LatestMetric {
                    tag: TEST_PSNR.to_string(),
                    latest_step: 7000,
                    latest_value: 24.5,
                    total_points: 1,
                },
            ]
        );
    }

    #[test]
    fn progress_block_layout() {
        let metrics = vec![LatestMetric {
            tag: TRAIN_TOTAL_LOSS.to_string(),
            latest_step: 1200,
            latest_value: 0.123456789,
            total_points: 12,
        }];

        let mut out = Vec::new();
        print_progress(&mut out, &at(), &metrics).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        let rule = "=".repeat(60);

        assert_eq!(
            lines,
            vec![
                "",
                rule.as_str(),
                "Training Progress - 2024-03-09 14:05:07",
                rule.as_str(),
                "total_loss          : 0.123457 (iter 1200)",
                rule.as_str(),
            ]
        );
    }

    #[test]
    fn waiting_line() {
        let mut out = Vec::new();
        print_waiting(&mut out, &at()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "No metrics found at 14:05:07 - training may not have started yet...\n"
        );
    }
}
