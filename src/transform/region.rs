//! Regional subset queries: membership filter, first reported case, date lower bound.

use chrono::NaiveDate;

use crate::domain::{FirstCase, MergedRecord};
use crate::error::AppError;

/// Keep rows whose `geo_id` is one of `codes`, stable-sorted by date.
pub fn filter_region(rows: &[MergedRecord], codes: &[String]) -> Result<Vec<MergedRecord>, AppError> {
    let mut out: Vec<MergedRecord> = rows
        .iter()
        .filter(|r| codes.iter().any(|c| *c == r.geo_id))
        .cloned()
        .collect();
    out.sort_by_key(|r| r.date);

    if out.is_empty() {
        return Err(AppError::empty(format!(
            "No records for region codes {}.",
            codes.join(", ")
        )));
    }
    log::info!("Region filter [{}]: {} rows", codes.join(","), out.len());
    Ok(out)
}

/// Distinct country names in first-appearance order.
pub fn unique_country_names(rows: &[MergedRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for r in rows {
        if let Some(name) = &r.country_name {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
    }
    names
}

/// For each code, the earliest row with at least one confirmed case.
pub fn first_cases(rows: &[MergedRecord], codes: &[String]) -> Vec<FirstCase> {
    codes
        .iter()
        .map(|code| FirstCase {
            geo_id: code.clone(),
            record: rows
                .iter()
                .filter(|r| r.geo_id == *code && r.confirmed_cases > 0)
                .min_by_key(|r| r.date)
                .cloned(),
        })
        .collect()
}

/// Keep rows dated on or after `cutoff`.
pub fn filter_from(rows: &[MergedRecord], cutoff: NaiveDate) -> Result<Vec<MergedRecord>, AppError> {
    let out: Vec<MergedRecord> = rows.iter().filter(|r| r.date >= cutoff).cloned().collect();
    if out.is_empty() {
        return Err(AppError::empty(format!("No records on or after {cutoff}.")));
    }
    Ok(out)
}
