//! SVG summary chart for one region, drawn with Plotters.
//!
//! Four stacked panels share a calendar x axis (days since the first date):
//! cumulative totals, daily counts (raw points + smoothed line), R number and
//! growth factor (with their display bounds and a reference line at 1.0), and
//! doubling time (raw points + smoothed line).
//!
//! Every panel is drawn the same way: series first, then the shared
//! `finish_panel` step adds the legend.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::domain::RegionReport;
use crate::error::AppError;
use crate::io::sanitize_file_stem;
use crate::stats::{Bounds, TimeSeries};

/// Metric colors, reused in order when a report has more metrics.
const PALETTE: [RGBColor; 4] = [
    RGBColor(31, 119, 180),  // blue
    RGBColor(214, 39, 40),   // red
    RGBColor(44, 160, 44),   // green
    RGBColor(148, 103, 189), // purple
];

type PanelResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

#[derive(Debug, Clone, Copy, PartialEq)]
enum LayerStyle {
    Line,
    Points,
}

struct Layer<'a> {
    label: String,
    series: &'a TimeSeries,
    color: RGBAColor,
    style: LayerStyle,
}

/// Calendar axis: x values are days since `start`.
#[derive(Debug, Clone, Copy)]
struct TimeAxis {
    start: NaiveDate,
    days: f64,
}

impl TimeAxis {
    fn for_report(report: &RegionReport) -> Option<Self> {
        let start = report.metrics.iter().filter_map(|m| m.cumulative.first_date()).min()?;
        let end = report.metrics.iter().filter_map(|m| m.cumulative.last_date()).max()?;
        Some(Self {
            start,
            days: (end - start).num_days().max(1) as f64,
        })
    }

    fn x(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64
    }

    fn label(&self, x: f64) -> String {
        self.start
            .checked_add_signed(Duration::days(x.round() as i64))
            .map(|d| d.format("%b %d").to_string())
            .unwrap_or_default()
    }
}

/// Render the region summary and write it to `<dir>/<region>.svg`.
pub fn write_region_svg(dir: &Path, report: &RegionReport, width: u32, height: u32) -> Result<PathBuf, AppError> {
    let svg = render_region_svg(report, width, height)?;
    fs::create_dir_all(dir)
        .map_err(|e| AppError::new(4, format!("Failed to create chart dir '{}': {e}", dir.display())))?;
    let path = dir.join(format!("{}.svg", sanitize_file_stem(&report.region)));
    fs::write(&path, svg)
        .map_err(|e| AppError::new(4, format!("Failed to write chart '{}': {e}", path.display())))?;
    Ok(path)
}

/// Render the region summary as an SVG document.
pub fn render_region_svg(report: &RegionReport, width: u32, height: u32) -> Result<String, AppError> {
    let axis = TimeAxis::for_report(report)
        .ok_or_else(|| AppError::new(4, format!("Nothing to chart for region '{}'.", report.region)))?;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw_region(&root, report, &axis)
            .map_err(|e| AppError::new(4, format!("Failed to render chart for '{}': {e}", report.region)))?;
        root.present()
            .map_err(|e| AppError::new(4, format!("Failed to finish chart for '{}': {e}", report.region)))?;
    }
    Ok(svg)
}

fn draw_region<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    report: &RegionReport,
    axis: &TimeAxis,
) -> PanelResult<DB> {
    root.fill(&WHITE)?;
    let root = root.titled(&report.region, ("sans-serif", 24))?;
    let panels = root.split_evenly((4, 1));

    let colored = || {
        report
            .metrics
            .iter()
            .enumerate()
            .map(|(i, m)| (m, PALETTE[i % PALETTE.len()].to_rgba()))
    };

    let totals: Vec<Layer> = colored()
        .map(|(m, color)| Layer {
            label: m.metric.clone(),
            series: &m.cumulative,
            color,
            style: LayerStyle::Line,
        })
        .collect();
    draw_panel(&panels[0], "Cumulative", axis, from_zero(&totals), None, &totals)?;

    let daily: Vec<Layer> = colored()
        .flat_map(|(m, color)| {
            [
                Layer {
                    label: format!("{} daily", m.metric),
                    series: &m.daily,
                    color: color.mix(0.35),
                    style: LayerStyle::Points,
                },
                Layer {
                    label: format!("{} smoothed", m.metric),
                    series: &m.daily_smoothed,
                    color,
                    style: LayerStyle::Line,
                },
            ]
        })
        .collect();
    draw_panel(&panels[1], "Daily new", axis, from_zero(&daily), None, &daily)?;

    let rates: Vec<Layer> = colored()
        .flat_map(|(m, color)| {
            [
                Layer {
                    label: format!("{} R", m.metric),
                    series: &m.r_number,
                    color,
                    style: LayerStyle::Line,
                },
                Layer {
                    label: format!("{} growth", m.metric),
                    series: &m.growth_factor,
                    color: color.mix(0.45),
                    style: LayerStyle::Line,
                },
            ]
        })
        .collect();
    let rate_bounds = union_bounds(
        report
            .metrics
            .iter()
            .flat_map(|m| [m.r_bounds, m.growth_bounds]),
    );
    draw_panel(&panels[2], "R number / growth factor", axis, rate_bounds, Some(1.0), &rates)?;

    let doubling: Vec<Layer> = colored()
        .flat_map(|(m, color)| {
            [
                Layer {
                    label: format!("{} doubling", m.metric),
                    series: &m.doubling_time,
                    color: color.mix(0.35),
                    style: LayerStyle::Points,
                },
                Layer {
                    label: format!("{} smoothed", m.metric),
                    series: &m.doubling_time_smoothed,
                    color,
                    style: LayerStyle::Line,
                },
            ]
        })
        .collect();
    let doubling_bounds = union_bounds(report.metrics.iter().map(|m| m.doubling_bounds));
    draw_panel(&panels[3], "Doubling time (days)", axis, doubling_bounds, None, &doubling)?;

    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    axis: &TimeAxis,
    y: (f64, f64),
    reference: Option<f64>,
    layers: &[Layer],
) -> PanelResult<DB> {
    let (y_min, y_max) = y;
    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 16))
        .margin(8)
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 30)
        .build_cartesian_2d(0f64..axis.days, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_labels(6)
        .y_labels(5)
        .x_label_formatter(&|x| axis.label(*x))
        .y_label_formatter(&|v| format!("{v:.2}"))
        .light_line_style(WHITE)
        .draw()?;

    if let Some(level) = reference.filter(|r| (y_min..=y_max).contains(r)) {
        chart.draw_series(LineSeries::new([(0.0, level), (axis.days, level)], BLACK.mix(0.5)))?;
    }

    for layer in layers {
        let color = layer.color;
        match layer.style {
            LayerStyle::Line => {
                for segment in segments(layer.series, axis, y) {
                    chart.draw_series(LineSeries::new(segment, color.stroke_width(2)))?;
                }
                chart
                    .draw_series(LineSeries::new(Vec::<(f64, f64)>::new(), color))?
                    .label(layer.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color.stroke_width(2)));
            }
            LayerStyle::Points => {
                chart
                    .draw_series(
                        segments(layer.series, axis, y)
                            .into_iter()
                            .flatten()
                            .map(|p| Circle::new(p, 2, color.filled())),
                    )?
                    .label(layer.label.as_str())
                    .legend(move |(x, y)| Circle::new((x + 7, y), 3, color.filled()));
            }
        }
    }

    finish_panel(&mut chart)
}

/// Shared post-processing for every panel.
fn finish_panel<'a, DB: DrawingBackend + 'a>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
) -> PanelResult<DB> {
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .label_font(("sans-serif", 11))
        .draw()
}

/// Split a series into drawable runs at undefined values, clamping y into
/// the panel range.
fn segments(series: &TimeSeries, axis: &TimeAxis, (y_min, y_max): (f64, f64)) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (date, value) in series.iter() {
        if value.is_finite() {
            current.push((axis.x(date), value.clamp(y_min, y_max)));
        } else if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// `0 .. max` with 5% headroom over every defined value in the layers.
fn from_zero(layers: &[Layer]) -> (f64, f64) {
    let max = layers
        .iter()
        .flat_map(|l| l.series.values())
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() && max > 0.0 {
        (0.0, max * 1.05)
    } else {
        (0.0, 1.0)
    }
}

fn union_bounds(bounds: impl Iterator<Item = Bounds>) -> (f64, f64) {
    let (lo, hi) = bounds.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
        (lo.min(b.min), hi.max(b.max))
    });
    if lo.is_finite() && hi.is_finite() && hi > lo {
        (lo, hi)
    } else {
        (0.0, 1.0)
    }
}
