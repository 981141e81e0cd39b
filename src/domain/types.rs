//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - produced by the loader and threaded through every pipeline step
//! - rendered as text tables or charts
//! - exported to CSV

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Months, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_CASES_URL: &str = "https://dqlab.id/data/covid19_worldwide_2020.json";
pub const DEFAULT_COUNTRIES_URL: &str = "https://dqlab.id/data/country_details.json";

/// Indonesia, Malaysia, Singapore, Thailand, Vietnam.
pub const ASEAN_GEO_IDS: [&str; 5] = ["ID", "MY", "SG", "TH", "VN"];

pub const DEFAULT_WINDOW: &str = "2020-08";
pub const DEFAULT_CUTOFF: &str = "2020-03-01";
pub const DEFAULT_TOP_N: usize = 20;

/// Columns the case dataset must provide.
pub const CASE_COLUMNS: [&str; 4] = ["date", "geo_id", "confirmed_cases", "deaths"];

/// Columns the country dataset must provide.
pub const COUNTRY_COLUMNS: [&str; 2] = ["geo_id", "country_name"];

/// Columns beyond the typed ones, kept as raw JSON values. `Null` means missing.
pub type Extras = BTreeMap<String, serde_json::Value>;

/// One case/death observation as loaded, before cleaning.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CaseRow {
    pub date: Option<NaiveDate>,
    pub geo_id: Option<String>,
    pub confirmed_cases: Option<i64>,
    pub deaths: Option<i64>,
    pub extras: Extras,
}

impl CaseRow {
    /// Whether the value in `column` is missing. Unknown columns count as missing.
    pub fn is_missing(&self, column: &str) -> bool {
        match column {
            "date" => self.date.is_none(),
            "geo_id" => self.geo_id.is_none(),
            "confirmed_cases" => self.confirmed_cases.is_none(),
            "deaths" => self.deaths.is_none(),
            other => self.extras.get(other).is_none_or(|v| v.is_null()),
        }
    }

    /// Convert into a fully-populated record, or `None` if any field is missing.
    pub fn into_record(self, columns: &[String]) -> Option<CaseRecord> {
        if columns.iter().any(|c| self.is_missing(c)) {
            return None;
        }
        Some(CaseRecord {
            date: self.date?,
            geo_id: self.geo_id?,
            confirmed_cases: self.confirmed_cases?,
            deaths: self.deaths?,
            extras: self.extras,
        })
    }
}

/// The raw case dataset: column names in first-seen order plus rows.
#[derive(Debug, Clone, Default)]
pub struct CaseTable {
    pub columns: Vec<String>,
    pub rows: Vec<CaseRow>,
}

impl CaseTable {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }
}

/// A cleaned case/death observation. Every field is present.
///
/// Counts are signed: upstream day-level data carries negative corrections.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseRecord {
    pub date: NaiveDate,
    pub geo_id: String,
    pub confirmed_cases: i64,
    pub deaths: i64,
    pub extras: Extras,
}

/// Country metadata keyed by `geo_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryInfo {
    pub geo_id: String,
    pub country_name: Option<String>,
    pub extras: Extras,
}

/// A case record joined with its country plus the derived fatality ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub date: NaiveDate,
    pub geo_id: String,
    pub country_name: Option<String>,
    pub confirmed_cases: i64,
    pub deaths: i64,
    pub fatality_ratio: f64,
    pub extras: Extras,
}

impl MergedRecord {
    pub fn country_label(&self) -> &str {
        self.country_name.as_deref().unwrap_or("-")
    }
}

/// Projection used by the global ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalRankRow {
    pub date: NaiveDate,
    pub geo_id: String,
    pub country_name: Option<String>,
    pub fatality_ratio: f64,
}

/// Per-country totals over a date window.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRecord {
    pub country_name: String,
    pub confirmed_cases: i64,
    pub deaths: i64,
    /// Number of daily rows summed into this record.
    pub days: usize,
    /// Sums of every other numeric column (e.g. `population`).
    pub other_totals: BTreeMap<String, f64>,
    pub fatality_ratio: f64,
}

/// Earliest record with at least one confirmed case for a country code.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstCase {
    pub geo_id: String,
    pub record: Option<MergedRecord>,
}

/// Where undefined (NaN) ratios land when ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NanOrder {
    /// NaN ratios sort after every number (dataframe default).
    #[default]
    Last,
    /// NaN ratios sort before every number.
    First,
}

/// A date window selected by ISO-date prefix: `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    prefix: String,
}

impl DateWindow {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let s = raw.trim();
        let valid = match s.len() {
            4 => s.chars().all(|c| c.is_ascii_digit()),
            7 => NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").is_ok(),
            10 => NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
            _ => false,
        };
        if !valid {
            return Err(AppError::usage(format!(
                "Invalid window '{raw}': expected YYYY, YYYY-MM or YYYY-MM-DD."
            )));
        }
        Ok(Self { prefix: s.to_string() })
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.format("%Y-%m-%d").to_string().starts_with(&self.prefix)
    }

    /// Move a month window by `delta` months. Other granularities don't shift.
    pub fn shift_months(&self, delta: i32) -> Option<Self> {
        if self.prefix.len() != 7 {
            return None;
        }
        let first = NaiveDate::parse_from_str(&format!("{}-01", self.prefix), "%Y-%m-%d").ok()?;
        let months = Months::new(delta.unsigned_abs());
        let moved = if delta >= 0 {
            first.checked_add_months(months)?
        } else {
            first.checked_sub_months(months)?
        };
        Some(Self {
            prefix: moved.format("%Y-%m").to_string(),
        })
    }
}

impl Default for DateWindow {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_WINDOW.to_string(),
        }
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.prefix)
    }
}

/// Parse a `YYYY-MM-DD` command-line date.
pub fn parse_cli_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| AppError::usage(format!("Invalid date '{raw}': {e}")))
}

/// Resolved settings for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub cases_source: String,
    pub countries_source: String,
    pub timeout_secs: u64,
    pub window: DateWindow,
    pub cutoff: NaiveDate,
    pub region: Vec<String>,
    pub region_label: String,
    pub top_n: usize,
    pub nan_order: NanOrder,
    pub head_rows: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_monthly: Option<PathBuf>,
    pub export_region: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cases_source: DEFAULT_CASES_URL.to_string(),
            countries_source: DEFAULT_COUNTRIES_URL.to_string(),
            timeout_secs: 60,
            window: DateWindow::default(),
            cutoff: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap_or(NaiveDate::MIN),
            region: ASEAN_GEO_IDS.iter().map(|s| s.to_string()).collect(),
            region_label: "ASEAN".to_string(),
            top_n: DEFAULT_TOP_N,
            nan_order: NanOrder::Last,
            head_rows: 5,
            plot: true,
            plot_width: 80,
            plot_height: 20,
            export_monthly: None,
            export_region: None,
        }
    }
}
