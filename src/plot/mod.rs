//! Chart descriptions handed to a renderer.
//!
//! The pipeline output is turned into plain data here (`BarChart`, `LineChart`);
//! `ascii` draws them on stdout and the TUI draws them with Plotters.

use chrono::NaiveDate;

use crate::domain::{DateWindow, MergedRecord, MonthlyRecord, NanOrder};
use crate::transform::cmp_ratio_desc;

pub mod ascii;

pub use ascii::{render_bar_chart, render_line_chart};

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Horizontal bar chart. Bars are stored bottom-to-top.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub value_label: String,
    pub category_label: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Multi-series line chart over dates.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

/// Window ranking as bars in ascending ratio order, so the highest ratio is drawn on top.
pub fn fatality_bar_chart(ranked: &[MonthlyRecord], window: &DateWindow, nan_order: NanOrder) -> BarChart {
    let mut bars: Vec<Bar> = ranked
        .iter()
        .map(|r| Bar {
            label: r.country_name.clone(),
            value: r.fatality_ratio,
        })
        .collect();
    bars.sort_by(|a, b| cmp_ratio_desc(a.value, b.value, nan_order).reverse());

    BarChart {
        title: format!("Top {} Highest Fatality Rate Countries ({window})", ranked.len()),
        value_label: "Fatality Rate".to_string(),
        category_label: "Country Name".to_string(),
        bars,
    }
}

/// Confirmed cases over time, one series per country name in first-appearance order.
pub fn cases_line_chart(rows: &[MergedRecord], region_label: &str) -> LineChart {
    let mut series: Vec<Series> = Vec::new();
    for r in rows {
        let name = r.country_label();
        let idx = match series.iter().position(|s| s.name == name) {
            Some(i) => i,
            None => {
                series.push(Series {
                    name: name.to_string(),
                    points: Vec::new(),
                });
                series.len() - 1
            }
        };
        series[idx].points.push((r.date, r.confirmed_cases as f64));
    }
    for s in &mut series {
        s.points.sort_by_key(|(d, _)| *d);
    }

    LineChart {
        title: format!(
            "Comparison of COVID19 Cases in {} {region_label} Countries",
            series.len()
        ),
        x_label: "Record Date".to_string(),
        y_label: "Total Cases".to_string(),
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Extras;
    use std::collections::BTreeMap;

    fn monthly(name: &str, ratio: f64) -> MonthlyRecord {
        MonthlyRecord {
            country_name: name.to_string(),
            confirmed_cases: 0,
            deaths: 0,
            days: 1,
            other_totals: BTreeMap::new(),
            fatality_ratio: ratio,
        }
    }

    #[test]
    fn bars_ascend_so_top_is_highest() {
        let ranked = vec![monthly("Yemen", 0.29), monthly("Mexico", 0.1), monthly("Chad", 0.05)];
        let chart = fatality_bar_chart(&ranked, &DateWindow::default(), NanOrder::Last);
        let labels: Vec<&str> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Chad", "Mexico", "Yemen"]);
        assert!(chart.title.contains("Top 3"));
    }

    #[test]
    fn one_series_per_country() {
        let row = |day: u32, geo: &str, name: &str, cases: i64| MergedRecord {
            date: NaiveDate::from_ymd_opt(2020, 3, day).unwrap(),
            geo_id: geo.to_string(),
            country_name: Some(name.to_string()),
            confirmed_cases: cases,
            deaths: 0,
            fatality_ratio: 0.0,
            extras: Extras::new(),
        };
        let rows = vec![
            row(1, "ID", "Indonesia", 2),
            row(1, "SG", "Singapore", 5),
            row(2, "ID", "Indonesia", 4),
        ];
        let chart = cases_line_chart(&rows, "ASEAN");
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "Indonesia");
        assert_eq!(chart.series[0].points.len(), 2);
        assert_eq!(chart.series[1].points[0].1, 5.0);
    }
}
