//! Side-by-side training curves rendered with plotters.
//!
//! One panel per compared metric on a 2x3 grid. Weak supervision is drawn in
//! blue, strong in red. Grid cells beyond the metric list stay blank.

use std::ops::Range;
use std::path::Path;

use depthcmp_core::metric_names::ComparedMetric;
use depthcmp_core::series::{MetricSeries, MetricSnapshot};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::CompareError;

pub const CHART_SIZE: (u32, u32) = (2700, 1800);
const GRID: (usize, usize) = (2, 3);
const LINE_WIDTH: u32 = 3;

fn chart_err(e: impl std::fmt::Display) -> CompareError {
    CompareError::Chart(e.to_string())
}

struct Curve {
    label: &'static str,
    color: RGBColor,
    points: Vec<(f64, f64)>,
}

fn curve(label: &'static str, color: RGBColor, series: Option<&MetricSeries>) -> Option<Curve> {
    let points: Vec<(f64, f64)> = series?
        .step_values()
        .into_iter()
        .filter(|(_, v)| v.is_finite())
        .collect();
    (!points.is_empty()).then_some(Curve {
        label,
        color,
        points,
    })
}

/// Render the comparison grid to a PNG at `path`.
pub fn render_chart(
    path: &Path,
    metrics: &[ComparedMetric],
    weak: Option<&MetricSnapshot>,
    strong: Option<&MetricSnapshot>,
) -> Result<(), CompareError> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let panels = root.split_evenly(GRID);
    for (metric, panel) in metrics.iter().zip(panels.iter()) {
        let curves: Vec<Curve> = [
            curve(
                "Weak Supervision",
                BLUE,
                weak.and_then(|s| s.get(metric.tag)),
            ),
            curve(
                "Strong Supervision",
                RED,
                strong.and_then(|s| s.get(metric.tag)),
            ),
        ]
        .into_iter()
        .flatten()
        .collect();

        draw_panel(panel, metric, &curves)?;
    }

    root.present().map_err(chart_err)
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    metric: &ComparedMetric,
    curves: &[Curve],
) -> Result<(), CompareError> {
    let (x_range, y_range) = bounds(curves);

    let mut chart = ChartBuilder::on(area)
        .caption(
            metric.title,
            ("sans-serif", 36).into_font().style(FontStyle::Bold),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d(x_range, y_range)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_desc("Iteration")
        .y_desc(metric.y_label)
        .label_style(("sans-serif", 20))
        .axis_desc_style(("sans-serif", 24))
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(BLACK.mix(0.05))
        .draw()
        .map_err(chart_err)?;

    for c in curves {
        let color = c.color;
        chart
            .draw_series(LineSeries::new(
                c.points.iter().copied(),
                color.stroke_width(LINE_WIDTH),
            ))
            .map_err(chart_err)?
            .label(c.label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(LINE_WIDTH))
            });
    }

    if !curves.is_empty() {
        chart
            .configure_series_labels()
            .label_font(("sans-serif", 22))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_err)?;
    }

    Ok(())
}

/// Axis ranges covering every curve, padded so flat or single-point curves
/// still get a usable span.
fn bounds(curves: &[Curve]) -> (Range<f64>, Range<f64>) {
    let mut points = curves.iter().flat_map(|c| c.points.iter().copied());
    let Some((x0, y0)) = points.next() else {
        return (0.0..1.0, 0.0..1.0);
    };

    let (mut x_min, mut x_max, mut y_min, mut y_max) = (x0, x0, y0, y0);
    for (x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    let x_range = if x_max > x_min {
        x_min..x_max
    } else {
        x_min - 1.0..x_max + 1.0
    };

    let y_pad = if y_max > y_min {
        (y_max - y_min) * 0.05
    } else {
        (y_max.abs() * 0.05).max(1.0)
    };

    (x_range, y_min - y_pad..y_max + y_pad)
}
