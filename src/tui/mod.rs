//! Ratatui-based terminal UI.
//!
//! The TUI shows the two charts of the report: the window fatality ranking as
//! horizontal bars, and confirmed cases per regional country as lines. The month
//! window can be moved without re-fetching; the merged table is kept in memory.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::RunOutput;
use crate::domain::AnalysisConfig;
use crate::error::AppError;
use crate::plot::{BarChart, LineChart};

mod plotters_chart;

use plotters_chart::{CasesLines, FatalityBars, PALETTE};

/// Load the data, then start the TUI.
pub fn run(config: AnalysisConfig) -> Result<(), AppError> {
    // Fetch before switching screens so load errors print normally.
    let run = crate::app::pipeline::run_analysis(&config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::io(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, run);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::io(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::io(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Bars,
    Lines,
}

struct App {
    config: AnalysisConfig,
    run: RunOutput,
    bars: BarChart,
    lines: LineChart,
    view: View,
    status: String,
}

impl App {
    fn new(config: AnalysisConfig, run: RunOutput) -> Self {
        let bars = crate::plot::fatality_bar_chart(&run.monthly, &config.window, config.nan_order);
        let lines = crate::plot::cases_line_chart(&run.region_from_cutoff, &config.region_label);
        let status = format!("{} merged rows", run.merged.len());
        Self {
            config,
            run,
            bars,
            lines,
            view: View::Bars,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::io(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::io(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::io(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => {
                self.view = match self.view {
                    View::Bars => View::Lines,
                    View::Lines => View::Bars,
                };
            }
            KeyCode::Left => self.shift_window(-1),
            KeyCode::Right => self.shift_window(1),
            _ => {}
        }
        false
    }

    fn shift_window(&mut self, delta: i32) {
        let Some(window) = self.config.window.shift_months(delta) else {
            self.status = format!("Window {} is not a month; cannot shift.", self.config.window);
            return;
        };

        let previous = std::mem::replace(&mut self.config.window, window);
        match crate::app::pipeline::rerank_window(&self.run, &self.config) {
            Ok(monthly) => {
                self.bars = crate::plot::fatality_bar_chart(&monthly, &self.config.window, self.config.nan_order);
                self.run.monthly = monthly;
                self.status = format!("window: {}", self.config.window);
            }
            Err(err) => {
                self.config.window = previous;
                self.status = err.to_string();
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        match self.view {
            View::Bars => self.draw_bars(frame, chunks[1]),
            View::Lines => self.draw_lines(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled("covid", Style::default().fg(Color::Cyan)),
                Span::raw(format!(" - COVID-19 in the World and {}", self.config.region_label)),
            ]),
            Line::from(Span::styled(
                format!(
                    "window: {} | cutoff: {} | region: {} | top: {} | rows: {}",
                    self.config.window,
                    self.config.cutoff,
                    self.config.region.join(","),
                    self.config.top_n,
                    self.run.merged.len(),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_bars(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title(self.bars.title.clone()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let x_max = bar_x_max(&self.bars);
        frame.render_widget(
            FatalityBars {
                bars: &self.bars.bars,
                x_max,
                x_label: &self.bars.value_label,
            },
            inner,
        );
    }

    fn draw_lines(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(24)])
            .split(area);

        let block = Block::default().title(self.lines.title.clone()).borders(Borders::ALL);
        let inner = block.inner(chunks[0]);
        frame.render_widget(block, chunks[0]);
        frame.render_widget(Clear, inner);

        if let Some(series) = line_series(&self.lines) {
            frame.render_widget(
                CasesLines {
                    lines: &series.lines,
                    start: series.start,
                    x_bounds: series.x_bounds,
                    y_bounds: series.y_bounds,
                    x_label: &self.lines.x_label,
                    y_label: &self.lines.y_label,
                },
                inner,
            );
        } else {
            let msg = Paragraph::new("No data to plot.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
        }

        let items: Vec<ListItem> = self
            .lines
            .series
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let (r, g, b) = PALETTE[i % PALETTE.len()];
                ListItem::new(Line::from(vec![
                    Span::styled("── ", Style::default().fg(Color::Rgb(r, g, b))),
                    Span::raw(s.name.clone()),
                ]))
            })
            .collect();
        let legend = List::new(items).block(Block::default().title("country_name").borders(Borders::ALL));
        frame.render_widget(legend, chunks[1]);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab switch chart  ←/→ month  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Largest finite bar value plus 5% headroom.
fn bar_x_max(chart: &BarChart) -> f64 {
    let max = chart
        .bars
        .iter()
        .map(|b| b.value)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    if max > 0.0 { max * 1.05 } else { 1.0 }
}

struct LineSeriesData {
    lines: Vec<Vec<(f64, f64)>>,
    start: chrono::NaiveDate,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Convert dated series into numeric (days since first date, value) lines plus bounds.
fn line_series(chart: &LineChart) -> Option<LineSeriesData> {
    let start = chart.series.iter().flat_map(|s| s.points.iter().map(|(d, _)| *d)).min()?;

    let lines: Vec<Vec<(f64, f64)>> = chart
        .series
        .iter()
        .map(|s| {
            s.points
                .iter()
                .filter(|(_, y)| y.is_finite())
                .map(|(d, y)| ((*d - start).num_days() as f64, *y))
                .collect()
        })
        .collect();

    let (mut x_max, mut y_min, mut y_max) = (0.0_f64, f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in lines.iter().flatten() {
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        y_min = 0.0;
        y_max = y_max.max(1.0);
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);

    Some(LineSeriesData {
        lines,
        start,
        x_bounds: [0.0, x_max.max(1.0)],
        y_bounds: [y_min - pad, y_max + pad],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{Bar, Series};
    use chrono::NaiveDate;

    #[test]
    fn bar_bounds_ignore_undefined_values() {
        let chart = BarChart {
            title: String::new(),
            value_label: String::new(),
            category_label: String::new(),
            bars: vec![
                Bar {
                    label: "A".to_string(),
                    value: f64::NAN,
                },
                Bar {
                    label: "B".to_string(),
                    value: 0.2,
                },
                Bar {
                    label: "C".to_string(),
                    value: f64::INFINITY,
                },
            ],
        };
        assert!((bar_x_max(&chart) - 0.21).abs() < 1e-12);
    }

    #[test]
    fn line_series_are_days_since_first_date() {
        let d = |day: u32| NaiveDate::from_ymd_opt(2020, 3, day).unwrap();
        let chart = LineChart {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            series: vec![
                Series {
                    name: "A".to_string(),
                    points: vec![(d(2), 10.0), (d(5), 40.0)],
                },
                Series {
                    name: "B".to_string(),
                    points: vec![(d(1), 0.0)],
                },
            ],
        };
        let data = line_series(&chart).unwrap();
        assert_eq!(data.start, d(1));
        assert_eq!(data.lines[0], vec![(1.0, 10.0), (4.0, 40.0)]);
        assert_eq!(data.x_bounds, [0.0, 4.0]);
        assert!(data.y_bounds[0] < 0.0 && data.y_bounds[1] > 40.0);
    }
}
