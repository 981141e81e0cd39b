//! JSON parsing into typed tables.
//!
//! Both datasets are JSON arrays of flat objects. A key that is absent or
//! `null` is a missing value; a key that holds the wrong type is a schema error.

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

use crate::domain::{CASE_COLUMNS, COUNTRY_COLUMNS, CaseRow, CaseTable, CountryInfo, Extras};
use crate::error::AppError;

/// Parse the case/death dataset.
pub fn parse_case_table(body: &str, origin: &str) -> Result<CaseTable, AppError> {
    let objects = parse_objects(body, origin)?;
    let columns = collect_columns(&objects);
    ensure_columns(&columns, &CASE_COLUMNS, origin)?;

    let mut rows = Vec::with_capacity(objects.len());
    for (i, mut obj) in objects.into_iter().enumerate() {
        let date = parse_date(obj.remove("date"), i, origin)?;
        let geo_id = parse_text(obj.remove("geo_id"), "geo_id", i, origin)?;
        let confirmed_cases = parse_count(obj.remove("confirmed_cases"), "confirmed_cases", i, origin)?;
        let deaths = parse_count(obj.remove("deaths"), "deaths", i, origin)?;
        rows.push(CaseRow {
            date,
            geo_id,
            confirmed_cases,
            deaths,
            extras: obj.into_iter().collect(),
        });
    }

    Ok(CaseTable { columns, rows })
}

/// Parse the country metadata dataset.
///
/// Rows without a `geo_id` can never be joined and are skipped.
pub fn parse_countries(body: &str, origin: &str) -> Result<Vec<CountryInfo>, AppError> {
    let objects = parse_objects(body, origin)?;
    let columns = collect_columns(&objects);
    ensure_columns(&columns, &COUNTRY_COLUMNS, origin)?;

    let mut out = Vec::with_capacity(objects.len());
    for (i, mut obj) in objects.into_iter().enumerate() {
        let Some(geo_id) = parse_text(obj.remove("geo_id"), "geo_id", i, origin)? else {
            log::warn!("{origin}: country row {i} has no geo_id; skipped");
            continue;
        };
        let country_name = parse_text(obj.remove("country_name"), "country_name", i, origin)?;
        let extras: Extras = obj.into_iter().collect();
        out.push(CountryInfo {
            geo_id,
            country_name,
            extras,
        });
    }
    Ok(out)
}

fn parse_objects(body: &str, origin: &str) -> Result<Vec<Map<String, Value>>, AppError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AppError::fetch(format!("Malformed JSON from {origin}: {e}")))?;

    let Value::Array(items) = value else {
        return Err(AppError::fetch(format!("Expected a JSON array of records from {origin}.")));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::fetch(format!("Record {i} from {origin} is not a JSON object."))),
        })
        .collect()
}

/// Union of keys across all records, in first-seen order.
fn collect_columns(objects: &[Map<String, Value>]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for obj in objects {
        for key in obj.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn ensure_columns(columns: &[String], required: &[&str], origin: &str) -> Result<(), AppError> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|r| !columns.iter().any(|c| c == r))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::schema(format!(
            "{origin} is missing required column(s): {}.",
            missing.join(", ")
        )))
    }
}

/// Dates arrive as `YYYY-MM-DD`, ISO date-times, or epoch milliseconds.
fn parse_date(value: Option<Value>, row: usize, origin: &str) -> Result<Option<NaiveDate>, AppError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => parse_date_text(&s).map(Some).ok_or_else(|| {
            AppError::schema(format!("{origin}: row {row} has an unparseable date '{s}'."))
        }),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| Some(dt.date_naive()))
            .ok_or_else(|| AppError::schema(format!("{origin}: row {row} has an invalid epoch date {n}."))),
        Some(other) => Err(AppError::schema(format!(
            "{origin}: row {row} has a non-date value in 'date': {other}"
        ))),
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    // Naive date-times such as "2020-01-01T00:00:00.000" or "2020-01-01 00:00:00".
    match s.as_bytes().get(10) {
        Some(b'T') | Some(b' ') => NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok(),
        _ => None,
    }
}

fn parse_count(value: Option<Value>, column: &str, row: usize, origin: &str) -> Result<Option<i64>, AppError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_i64() {
                return Ok(Some(v));
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                _ => Err(AppError::schema(format!(
                    "{origin}: row {row} has a non-integer '{column}': {n}"
                ))),
            }
        }
        Some(other) => Err(AppError::schema(format!(
            "{origin}: row {row} has a non-numeric '{column}': {other}"
        ))),
    }
}

fn parse_text(value: Option<Value>, column: &str, row: usize, origin: &str) -> Result<Option<String>, AppError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(AppError::schema(format!(
            "{origin}: row {row} has a non-text '{column}': {other}"
        ))),
    }
}
