//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Bar charts draw `#` bars with the value printed after each bar.
//! Line charts give every series its own glyph plus a legend.

use chrono::NaiveDate;

use crate::plot::{BarChart, LineChart};

const GLYPHS: [char; 8] = ['*', 'o', '+', 'x', '#', '@', '%', '&'];

/// Render a horizontal bar chart. The last bar is printed first (top).
pub fn render_bar_chart(chart: &BarChart, width: usize) -> String {
    let width = width.max(20);

    let labels: Vec<String> = chart.bars.iter().map(|b| truncate(&b.label, 24)).collect();
    let values: Vec<String> = chart.bars.iter().map(|b| fmt_value(b.value)).collect();
    let label_w = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let value_w = values.iter().map(|v| v.len()).max().unwrap_or(0);
    let bar_w = width.saturating_sub(label_w + 3 + value_w).max(10);

    let max = chart
        .bars
        .iter()
        .map(|b| b.value)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    let mut out = String::new();
    out.push_str(&chart.title);
    out.push('\n');

    for i in (0..chart.bars.len()).rev() {
        let value = chart.bars[i].value;
        let len = bar_len(value, max, bar_w);
        let bar = "#".repeat(len);
        out.push_str(&format!(
            "{:<label_w$} |{:<bar_w$} {}\n",
            labels[i], bar, values[i]
        ));
    }

    out.push_str(&format!("x: {} | y: {}\n", chart.value_label, chart.category_label));
    out
}

fn bar_len(value: f64, max: f64, bar_w: usize) -> usize {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    if value.is_infinite() || max <= 0.0 {
        return bar_w;
    }
    ((value / max) * bar_w as f64).round().min(bar_w as f64) as usize
}

/// Render a multi-series line chart over dates.
pub fn render_line_chart(chart: &LineChart, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let mut out = String::new();
    out.push_str(&chart.title);
    out.push('\n');

    let Some((d_min, d_max)) = date_range(chart) else {
        out.push_str("(no data)\n");
        return out;
    };
    let span = ((d_max - d_min).num_days() as f64).max(1.0);

    let (y_min, y_max) = y_range(chart);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    for (i, series) in chart.series.iter().enumerate() {
        let glyph = GLYPHS[i % GLYPHS.len()];
        let mut prev = None;
        for &(d, y) in &series.points {
            if !y.is_finite() {
                prev = None;
                continue;
            }
            let t = (d - d_min).num_days() as f64;
            let x = map_x(t, 0.0, span, width);
            let yy = map_y(y, y_min, y_max, height);
            match prev {
                Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, yy, glyph),
                None => grid[yy][x] = glyph,
            }
            prev = Some((x, yy));
        }
    }

    out.push_str(&format!(
        "Plot: date=[{d_min}, {d_max}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    for (i, series) in chart.series.iter().enumerate() {
        out.push_str(&format!("{} {}\n", GLYPHS[i % GLYPHS.len()], series.name));
    }
    out
}

fn date_range(chart: &LineChart) -> Option<(NaiveDate, NaiveDate)> {
    let mut range: Option<(NaiveDate, NaiveDate)> = None;
    for s in &chart.series {
        for &(d, _) in &s.points {
            range = Some(match range {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            });
        }
    }
    range
}

/// Finite y extent. A flat or empty extent is widened to start at 0 and keeps its top.
fn y_range(chart: &LineChart) -> (f64, f64) {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for s in &chart.series {
        for &(_, y) in &s.points {
            if y.is_finite() {
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
    }
    if !min_y.is_finite() || !max_y.is_finite() || max_y <= min_y {
        min_y = 0.0;
        max_y = max_y.max(1.0);
    }
    (min_y, max_y)
}

fn fmt_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        "inf".to_string()
    } else {
        format!("{v:.4}")
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Only blank cells are written.
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
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
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

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{Bar, Series};

    #[test]
    fn bar_chart_golden_snapshot_small() {
        let chart = BarChart {
            title: "Top".to_string(),
            value_label: "Fatality Rate".to_string(),
            category_label: "Country Name".to_string(),
            bars: vec![
                Bar {
                    label: "A".to_string(),
                    value: 0.1,
                },
                Bar {
                    label: "B".to_string(),
                    value: 0.2,
                },
            ],
        };
        let txt = render_bar_chart(&chart, 30);
        let expected = concat!(
            "Top\n",
            "B |#################### 0.2000\n",
            "A |##########           0.1000\n",
            "x: Fatality Rate | y: Country Name\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn undefined_bars_have_no_length() {
        assert_eq!(bar_len(f64::NAN, 1.0, 10), 0);
        assert_eq!(bar_len(f64::INFINITY, 1.0, 10), 10);
        assert_eq!(bar_len(-0.5, 1.0, 10), 0);
    }

    #[test]
    fn line_chart_golden_snapshot_small() {
        let d1 = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let d3 = NaiveDate::from_ymd_opt(2020, 3, 3).unwrap();
        let chart = LineChart {
            title: "Cases".to_string(),
            x_label: "Record Date".to_string(),
            y_label: "Total Cases".to_string(),
            series: vec![
                Series {
                    name: "A".to_string(),
                    points: vec![(d1, 0.0), (d3, 0.0)],
                },
                Series {
                    name: "B".to_string(),
                    points: vec![(d1, 10.0), (d3, 10.0)],
                },
            ],
        };

        let txt = render_line_chart(&chart, 10, 5);
        let expected = concat!(
            "Cases\n",
            "Plot: date=[2020-03-01, 2020-03-03] | y=[-0.50, 10.50]\n",
            "oooooooooo\n",
            "          \n",
            "          \n",
            "          \n",
            "**********\n",
            "* A\n",
            "o B\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn flat_series_keeps_its_level_on_the_axis() {
        let d1 = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2020, 3, 2).unwrap();
        let chart = LineChart {
            title: "Cases".to_string(),
            x_label: String::new(),
            y_label: String::new(),
            series: vec![Series {
                name: "A".to_string(),
                points: vec![(d1, 1000.0), (d2, 1000.0)],
            }],
        };

        let txt = render_line_chart(&chart, 10, 5);
        let mut lines = txt.lines().skip(1);
        assert_eq!(
            lines.next(),
            Some("Plot: date=[2020-03-01, 2020-03-02] | y=[-50.00, 1050.00]")
        );
        assert_eq!(lines.next(), Some("**********"));
        assert_eq!(y_range(&chart), (0.0, 1000.0));
    }

    #[test]
    fn empty_line_chart_says_so() {
        let chart = LineChart {
            title: "Cases".to_string(),
            x_label: String::new(),
            y_label: String::new(),
            series: Vec::new(),
        };
        assert_eq!(render_line_chart(&chart, 10, 5), "Cases\n(no data)\n");
    }
}
