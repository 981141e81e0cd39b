//! Formatted terminal output: dataset summaries, previews and ranking tables.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized

use std::collections::BTreeSet;

use crate::app::pipeline::RunOutput;
use crate::domain::{
    AnalysisConfig, CaseTable, CountryInfo, DateWindow, Extras, FirstCase, GlobalRankRow, MergedRecord,
    MonthlyRecord,
};
use crate::transform::MissingCounts;

/// Full report, in pipeline order.
pub fn format_run_report(run: &RunOutput, config: &AnalysisConfig) -> String {
    let n = config.head_rows;
    let mut out = String::new();

    out.push_str("=== COVID-19 in the World and ");
    out.push_str(&config.region_label);
    out.push_str(" ===\n\n");

    out.push_str(&format_shape(run.raw.cases.n_rows(), run.raw.cases.n_columns()));
    out.push_str(&format!("\nTop {n} data:\n"));
    out.push_str(&format_case_head(&run.raw.cases, n));

    out.push_str("\nColumn info:\n");
    out.push_str(&format_column_info(&run.raw.cases));

    out.push_str("\nMissing values per column:\n");
    out.push_str(&format_missing_counts(&run.cleaned.missing_before));
    out.push_str("\nMissing values per column after cleaning:\n");
    out.push_str(&format_missing_counts(&run.cleaned.missing_after));
    out.push_str(&format!(
        "Rows: {} -> {} ({} dropped)\n",
        run.cleaned.rows_before,
        run.cleaned.records.len(),
        run.cleaned.rows_dropped()
    ));

    out.push_str(&format!("\nCountries ({}):\n", run.raw.countries.len()));
    out.push_str(&format_country_head(&run.raw.countries, n));

    out.push_str(&format!("\nMerged data ({} rows):\n", run.merged.len()));
    out.push_str(&format_merged_head(&run.merged, n));

    out.push('\n');
    out.push_str(&format_rankings(run, config));

    out.push_str(&format!(
        "\n{} countries found: {}\n",
        config.region_label,
        run.region_names.join(", ")
    ));
    out.push_str(&format_merged_head(&run.region, n));

    out.push_str(&format!("\nFirst case in {} countries:\n", config.region_label));
    out.push_str(&format_first_cases(&run.first_cases));

    out.push_str(&format!(
        "\n{} cases from {} ({} rows):\n",
        config.region_label,
        config.cutoff,
        run.region_from_cutoff.len()
    ));
    out.push_str(&format_merged_head(&run.region_from_cutoff, n));

    out
}

/// Global and window rankings only.
pub fn format_rankings(run: &RunOutput, config: &AnalysisConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Top {} highest fatality ratio (single day):\n",
        config.top_n
    ));
    out.push_str(&format_global_ranking(&run.global));
    out.push('\n');
    out.push_str(&format_monthly_ranking(&run.monthly, &config.window));
    out
}

pub fn format_shape(n_rows: usize, n_columns: usize) -> String {
    format!("Dataset size: {n_columns} columns and {n_rows} rows.\n")
}

/// Per column: non-null count and inferred type.
pub fn format_column_info(table: &CaseTable) -> String {
    let rows = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let non_null = table.rows.iter().filter(|r| !r.is_missing(c)).count();
            vec![
                i.to_string(),
                c.clone(),
                format!("{non_null} non-null"),
                column_type(table, c).to_string(),
            ]
        })
        .collect();
    render_table(&["#", "column", "count", "type"], &[true, false, false, false], rows)
}

pub fn format_missing_counts(counts: &MissingCounts) -> String {
    let rows = counts
        .0
        .iter()
        .map(|(c, n)| vec![c.clone(), n.to_string()])
        .collect();
    render_table(&["column", "missing"], &[false, true], rows)
}

pub fn format_case_head(table: &CaseTable, n: usize) -> String {
    let rows = table
        .rows
        .iter()
        .take(n)
        .map(|r| {
            table
                .columns
                .iter()
                .map(|c| match c.as_str() {
                    "date" => opt(r.date.map(|d| d.to_string())),
                    "geo_id" => opt(r.geo_id.clone()),
                    "confirmed_cases" => opt(r.confirmed_cases.map(|v| v.to_string())),
                    "deaths" => opt(r.deaths.map(|v| v.to_string())),
                    other => fmt_extra(&r.extras, other),
                })
                .collect()
        })
        .collect();
    let headers: Vec<&str> = table.columns.iter().map(String::as_str).collect();
    let right: Vec<bool> = table.columns.iter().map(|c| is_count_column(c)).collect();
    render_table(&headers, &right, rows)
}

pub fn format_country_head(countries: &[CountryInfo], n: usize) -> String {
    let shown = &countries[..n.min(countries.len())];
    let extra_cols = extra_columns(shown.iter().map(|c| &c.extras));

    let mut headers = vec!["geo_id", "country_name"];
    headers.extend(extra_cols.iter().map(String::as_str));
    let right: Vec<bool> = headers.iter().map(|_| false).collect();

    let rows = shown
        .iter()
        .map(|c| {
            let mut row = vec![c.geo_id.clone(), opt(c.country_name.clone())];
            row.extend(extra_cols.iter().map(|k| fmt_extra(&c.extras, k)));
            row
        })
        .collect();
    render_table(&headers, &right, rows)
}

pub fn format_merged_head(rows: &[MergedRecord], n: usize) -> String {
    let shown = &rows[..n.min(rows.len())];
    let extra_cols = extra_columns(shown.iter().map(|r| &r.extras));

    let mut headers = vec!["date", "geo_id", "country_name", "confirmed_cases", "deaths", "fatality_ratio"];
    headers.extend(extra_cols.iter().map(String::as_str));
    let mut right = vec![false, false, false, true, true, true];
    right.extend(extra_cols.iter().map(|_| false));

    let body = shown
        .iter()
        .map(|r| {
            let mut row = vec![
                r.date.to_string(),
                r.geo_id.clone(),
                truncate(r.country_label(), 32),
                r.confirmed_cases.to_string(),
                r.deaths.to_string(),
                fmt_ratio(r.fatality_ratio),
            ];
            row.extend(extra_cols.iter().map(|k| fmt_extra(&r.extras, k)));
            row
        })
        .collect();
    render_table(&headers, &right, body)
}

pub fn format_global_ranking(rows: &[GlobalRankRow]) -> String {
    let body = rows
        .iter()
        .map(|r| {
            vec![
                r.date.to_string(),
                r.geo_id.clone(),
                truncate(r.country_name.as_deref().unwrap_or("-"), 32),
                fmt_ratio(r.fatality_ratio),
            ]
        })
        .collect();
    render_table(
        &["date", "geo_id", "country_name", "fatality_ratio"],
        &[false, false, false, true],
        body,
    )
}

pub fn format_monthly_ranking(rows: &[MonthlyRecord], window: &DateWindow) -> String {
    let mut out = format!("Countries with the highest fatality ratio in {window}:\n");
    let body = rows
        .iter()
        .map(|r| {
            vec![
                truncate(&r.country_name, 32),
                r.confirmed_cases.to_string(),
                r.deaths.to_string(),
                fmt_ratio(r.fatality_ratio),
            ]
        })
        .collect();
    out.push_str(&render_table(
        &["country_name", "confirmed_cases", "deaths", "fatality_ratio"],
        &[false, true, true, true],
        body,
    ));
    out
}

pub fn format_first_cases(first: &[FirstCase]) -> String {
    let body = first
        .iter()
        .map(|f| match &f.record {
            Some(r) => vec![
                f.geo_id.clone(),
                r.date.to_string(),
                r.confirmed_cases.to_string(),
                truncate(r.country_label(), 32),
            ],
            None => vec![f.geo_id.clone(), "-".to_string(), "-".to_string(), "(no cases)".to_string()],
        })
        .collect();
    render_table(
        &["geo_id", "date", "confirmed_cases", "country_name"],
        &[false, false, true, false],
        body,
    )
}

/// Ratio as text; undefined values stay visible as `NaN` / `inf`.
pub fn fmt_ratio(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else {
        format!("{v:.6}")
    }
}

fn column_type(table: &CaseTable, column: &str) -> &'static str {
    match column {
        "date" => "date",
        "geo_id" => "text",
        "confirmed_cases" | "deaths" => "int64",
        other => table
            .rows
            .iter()
            .filter_map(|r| r.extras.get(other))
            .find(|v| !v.is_null())
            .map(|v| match v {
                serde_json::Value::Number(n) if n.is_f64() => "float64",
                serde_json::Value::Number(_) => "int64",
                serde_json::Value::String(_) => "text",
                serde_json::Value::Bool(_) => "bool",
                _ => "object",
            })
            .unwrap_or("object"),
    }
}

fn is_count_column(c: &str) -> bool {
    matches!(c, "confirmed_cases" | "deaths")
}

fn extra_columns<'a>(extras: impl Iterator<Item = &'a Extras>) -> Vec<String> {
    let keys: BTreeSet<&String> = extras.flat_map(|e| e.keys()).collect();
    keys.into_iter().cloned().collect()
}

fn fmt_extra(extras: &Extras, key: &str) -> String {
    match extras.get(key) {
        None | Some(serde_json::Value::Null) => "NaN".to_string(),
        Some(serde_json::Value::String(s)) => truncate(s, 32),
        Some(v) => v.to_string(),
    }
}

fn opt(v: Option<String>) -> String {
    v.unwrap_or_else(|| "NaN".to_string())
}

/// Render rows under headers with per-column widths. `right[i]` right-aligns column `i`.
fn render_table(headers: &[&str], right: &[bool], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let fmt_row = |cells: &[String]| -> String {
        let parts: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                if right.get(i).copied().unwrap_or(false) {
                    format!("{cell:>w$}")
                } else {
                    format!("{cell:<w$}")
                }
            })
            .collect();
        parts.join(" ").trim_end().to_string()
    };

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    out.push_str(&fmt_row(&header_cells));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join(" "));
    out.push('\n');
    for row in &rows {
        out.push_str(&fmt_row(row));
        out.push('\n');
    }
    if rows.is_empty() {
        out.push_str("(empty)\n");
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn ratio_text() {
        assert_eq!(fmt_ratio(0.05), "0.050000");
        assert_eq!(fmt_ratio(f64::NAN), "NaN");
        assert_eq!(fmt_ratio(f64::INFINITY), "inf");
    }

    #[test]
    fn table_aligns_columns() {
        let txt = render_table(
            &["name", "n"],
            &[false, true],
            vec![
                vec!["Yemen".to_string(), "5".to_string()],
                vec!["Indonesia".to_string(), "120".to_string()],
            ],
        );
        let expected = concat!(
            "name        n\n",
            "--------- ---\n",
            "Yemen       5\n",
            "Indonesia 120\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn monthly_table_lists_countries_in_rank_order() {
        let rows = vec![
            MonthlyRecord {
                country_name: "Yemen".to_string(),
                confirmed_cases: 20,
                deaths: 5,
                days: 2,
                other_totals: Default::default(),
                fatality_ratio: 0.25,
            },
            MonthlyRecord {
                country_name: "Indonesia".to_string(),
                confirmed_cases: 300,
                deaths: 10,
                days: 2,
                other_totals: Default::default(),
                fatality_ratio: 10.0 / 300.0,
            },
        ];
        let txt = format_monthly_ranking(&rows, &DateWindow::default());
        assert!(txt.starts_with("Countries with the highest fatality ratio in 2020-08:\n"));
        let yemen = txt.find("Yemen").unwrap();
        let indonesia = txt.find("Indonesia").unwrap();
        assert!(yemen < indonesia);
        assert!(txt.contains("0.250000"));
    }

    #[test]
    fn first_cases_show_missing_countries() {
        let first = vec![
            FirstCase {
                geo_id: "ID".to_string(),
                record: Some(MergedRecord {
                    date: NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(),
                    geo_id: "ID".to_string(),
                    country_name: Some("Indonesia".to_string()),
                    confirmed_cases: 2,
                    deaths: 0,
                    fatality_ratio: 0.0,
                    extras: Extras::new(),
                }),
            },
            FirstCase {
                geo_id: "VN".to_string(),
                record: None,
            },
        ];
        let txt = format_first_cases(&first);
        assert!(txt.contains("2020-03-02"));
        assert!(txt.contains("(no cases)"));
    }

    #[test]
    fn shape_line() {
        assert_eq!(format_shape(10, 4), "Dataset size: 4 columns and 10 rows.\n");
    }
}
