//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - raw points: `o`
//! - smoothed or derived series: `-` line, broken wherever a value is undefined
//! - optional reference level (e.g. `R = 1`): `.` row

use chrono::NaiveDate;

use crate::domain::MetricReport;
use crate::stats::TimeSeries;

const POINT: char = 'o';
const LINE: char = '-';
const REFERENCE: char = '.';

/// Daily new counts as points with the smoothed curve on top.
pub fn render_daily_plot(report: &MetricReport, width: usize, height: usize) -> String {
    render_plot(
        &format!("{} per day", report.metric),
        Some(&report.daily),
        &report.daily_smoothed,
        None,
        None,
        width,
        height,
    )
}

/// R number clipped to its display bounds, with the `R = 1` level marked.
pub fn render_r_plot(report: &MetricReport, width: usize, height: usize) -> String {
    render_plot(
        &format!("{} R", report.metric),
        None,
        &report.r_number,
        Some((report.r_bounds.min, report.r_bounds.max)),
        Some(1.0),
        width,
        height,
    )
}

/// Render `line` (and optionally `points`) against calendar days.
///
/// `y_range` fixes the vertical range; values outside it are drawn on the
/// nearest edge. Without it the range comes from the data plus 5% padding.
pub fn render_plot(
    label: &str,
    points: Option<&TimeSeries>,
    line: &TimeSeries,
    y_range: Option<(f64, f64)>,
    reference: Option<f64>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((start, end)) = date_range(points, line) else {
        return format!("Plot: {label} | no data\n");
    };
    let x_span = (end - start).num_days().max(1) as f64;

    let (y_min, y_max) = match y_range {
        Some((lo, hi)) if lo.is_finite() && hi.is_finite() && hi > lo => (lo, hi),
        _ => {
            let (lo, hi) = value_range(points, line).unwrap_or((0.0, 1.0));
            pad_range(lo, hi, 0.05)
        }
    };

    let mut grid = vec![vec![' '; width]; height];

    if let Some(level) = reference.filter(|r| (y_min..=y_max).contains(r)) {
        let y = map_y(level, y_min, y_max, height);
        grid[y].iter_mut().for_each(|c| *c = REFERENCE);
    }

    let to_x = |d: NaiveDate| map_x((d - start).num_days() as f64, x_span, width);
    draw_series(&mut grid, line, &to_x, y_min, y_max);

    if let Some(points) = points {
        for (date, value) in points.iter().filter(|(_, v)| v.is_finite()) {
            let y = map_y(value, y_min, y_max, height);
            grid[y][to_x(date)] = POINT;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {label} | {start} .. {end} | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn date_range(points: Option<&TimeSeries>, line: &TimeSeries) -> Option<(NaiveDate, NaiveDate)> {
    let firsts = [line.first_date(), points.and_then(TimeSeries::first_date)];
    let lasts = [line.last_date(), points.and_then(TimeSeries::last_date)];
    let start = firsts.into_iter().flatten().min()?;
    let end = lasts.into_iter().flatten().max()?;
    Some((start, end))
}

fn value_range(points: Option<&TimeSeries>, line: &TimeSeries) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    let values = line
        .values()
        .iter()
        .chain(points.map(TimeSeries::values).unwrap_or(&[]));
    for &v in values.filter(|v| v.is_finite()) {
        min_y = min_y.min(v);
        max_y = max_y.max(v);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Flat series: give it a unit-high band.
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(day: f64, span: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = (day / span).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_series(
    grid: &mut [Vec<char>],
    series: &TimeSeries,
    to_x: &impl Fn(NaiveDate) -> usize,
    y_min: f64,
    y_max: f64,
) {
    let height = grid.len();
    let mut prev = None;
    for (date, value) in series.iter() {
        if !value.is_finite() {
            prev = None;
            continue;
        }
        let x = to_x(date);
        let y = map_y(value, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, y, LINE),
            None => grid[y][x] = LINE,
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham-ish). Only blank and reference cells are
/// overwritten.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if *cell == ' ' || *cell == REFERENCE {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let nan = f64::NAN;
        let line = TimeSeries::daily_from(start(), vec![1.0, 1.0, 1.0, 1.0, 1.0, nan, 3.0, 3.0, 3.0, 3.0]);

        let txt = render_plot("test", None, &line, None, Some(2.0), 10, 5);
        let expected = concat!(
            "Plot: test | 2020-03-01 .. 2020-03-10 | y=[0.90, 3.10]\n",
            "      ----\n",
            "          \n",
            "..........\n",
            "          \n",
            "-----     \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn points_overlay_and_fixed_range_clips() {
        let line = TimeSeries::daily_from(start(), vec![1.0; 10]);
        let mut raw = vec![1.0; 10];
        raw[3] = 10.0;
        let points = TimeSeries::daily_from(start(), raw);

        let txt = render_plot("clip", Some(&points), &line, Some((0.0, 2.0)), None, 10, 5);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(rows[0], "   o      ");
        assert_eq!(rows[2], "ooo-oooooo");
    }

    #[test]
    fn empty_series_renders_placeholder() {
        let txt = render_plot("none", None, &TimeSeries::empty(), None, None, 20, 5);
        assert_eq!(txt, "Plot: none | no data\n");
    }
}
