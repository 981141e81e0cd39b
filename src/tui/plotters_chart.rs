//! Plotters-powered chart widgets for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.
//! All series and bounds are computed by the caller; `render()` only draws.

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters::style::Color as _;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::plot::Bar;

/// Series colors, shared with the legend.
pub const PALETTE: [(u8, u8, u8); 8] = [
    (0, 255, 255),
    (255, 200, 0),
    (0, 255, 0),
    (255, 0, 255),
    (255, 80, 80),
    (120, 160, 255),
    (255, 255, 255),
    (255, 140, 0),
];

fn too_small(area: Rect, buf: &mut Buffer) -> bool {
    // When the available area is too small, Plotters may fail to build a chart.
    // In that case, we render a small hint rather than panicking.
    if area.width < 20 || area.height < 8 {
        buf.set_string(
            area.x,
            area.y,
            "Chart area too small (resize terminal).",
            Style::default().fg(Color::Yellow),
        );
        return true;
    }
    false
}

/// Horizontal bars, index 0 at the bottom.
pub struct FatalityBars<'a> {
    pub bars: &'a [Bar],
    /// Upper x bound; infinite ratios are drawn to this value.
    pub x_max: f64,
    pub x_label: &'a str,
}

impl<'a> Widget for FatalityBars<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if too_small(area, buf) {
            return;
        }
        let n = self.bars.len();
        if n == 0 || !(self.x_max.is_finite() && self.x_max > 0.0) {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 14)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(0.0..self.x_max, 0.0..n as f64)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .x_labels(5)
                .y_labels(n)
                .x_label_formatter(&|v| format!("{v:.2}"))
                .y_label_formatter(&|v| {
                    let i = v.floor().max(0.0) as usize;
                    self.bars
                        .get(i)
                        .map(|b| b.label.chars().take(12).collect())
                        .unwrap_or_default()
                })
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let (r, g, b) = PALETTE[0];
            let bar_color = RGBColor(r, g, b);
            chart.draw_series(
                self.bars
                    .iter()
                    .enumerate()
                    .filter(|(_, bar)| bar.value > 0.0)
                    .map(|(i, bar)| {
                        let y = i as f64;
                        Rectangle::new(
                            [(0.0, y + 0.15), (bar.value.min(self.x_max), y + 0.85)],
                            bar_color.filled(),
                        )
                    }),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// One line per series; x is days since `start`.
pub struct CasesLines<'a> {
    pub lines: &'a [Vec<(f64, f64)>],
    pub start: NaiveDate,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
}

impl<'a> Widget for CasesLines<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if too_small(area, buf) {
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let start = self.start;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Mesh lines add clutter at terminal resolution; axes + labels are enough.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (start + Duration::days(v.round() as i64)).format("%Y-%m-%d").to_string())
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for (i, line) in self.lines.iter().enumerate() {
                let (r, g, b) = PALETTE[i % PALETTE.len()];
                chart.draw_series(LineSeries::new(line.iter().copied(), &RGBColor(r, g, b)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
