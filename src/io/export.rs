//! Export rankings and regional series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{DateWindow, MergedRecord, MonthlyRecord};
use crate::error::AppError;

/// Write the window ranking to a CSV file.
///
/// Summed numeric country columns (`other_totals`) follow the fixed columns,
/// in name order; a country without a total for a column gets an empty cell.
pub fn write_monthly_csv(path: &Path, rows: &[MonthlyRecord], window: &DateWindow) -> Result<(), AppError> {
    let mut out = create(path)?;

    let extra: BTreeSet<&str> = rows
        .iter()
        .flat_map(|r| r.other_totals.keys().map(String::as_str))
        .collect();

    let mut header = String::from("window,rank,country_name,confirmed_cases,deaths,days,fatality_ratio");
    for key in &extra {
        header.push(',');
        header.push_str(&csv_field(key));
    }
    writeln!(out, "{header}").map_err(|e| write_err(path, e))?;

    for (i, r) in rows.iter().enumerate() {
        let mut line = format!(
            "{},{},{},{},{},{},{}",
            window,
            i + 1,
            csv_field(&r.country_name),
            r.confirmed_cases,
            r.deaths,
            r.days,
            r.fatality_ratio,
        );
        for key in &extra {
            line.push(',');
            if let Some(v) = r.other_totals.get(*key) {
                line.push_str(&v.to_string());
            }
        }
        writeln!(out, "{line}").map_err(|e| write_err(path, e))?;
    }

    out.flush().map_err(|e| write_err(path, e))
}

/// Write regional daily rows (date, country, cases, deaths, ratio) to a CSV file.
pub fn write_region_csv(path: &Path, rows: &[MergedRecord]) -> Result<(), AppError> {
    let mut out = create(path)?;

    writeln!(out, "date,geo_id,country_name,confirmed_cases,deaths,fatality_ratio")
        .map_err(|e| write_err(path, e))?;

    for r in rows {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            r.date,
            csv_field(&r.geo_id),
            csv_field(r.country_name.as_deref().unwrap_or("")),
            r.confirmed_cases,
            r.deaths,
            r.fatality_ratio,
        )
        .map_err(|e| write_err(path, e))?;
    }

    out.flush().map_err(|e| write_err(path, e))
}

fn create(path: &Path) -> Result<BufWriter<File>, AppError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| AppError::io(format!("Failed to create export CSV '{}': {e}", path.display())))
}

fn write_err(path: &Path, e: std::io::Error) -> AppError {
    AppError::io(format!("Failed to write export CSV '{}': {e}", path.display()))
}

/// Quote a field when it contains a delimiter, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn quoting() {
        assert_eq!(csv_field("Yemen"), "Yemen");
        assert_eq!(csv_field("Korea, Republic of"), "\"Korea, Republic of\"");
        assert_eq!(csv_field("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn monthly_export_round_trip_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monthly.csv");
        let rows = vec![MonthlyRecord {
            country_name: "Bonaire, Saint Eustatius and Saba".to_string(),
            confirmed_cases: 40,
            deaths: 2,
            days: 31,
            other_totals: BTreeMap::new(),
            fatality_ratio: 0.05,
        }];
        write_monthly_csv(&path, &rows, &DateWindow::default()).unwrap();

        let txt = std::fs::read_to_string(&path).unwrap();
        let mut lines = txt.lines();
        assert_eq!(
            lines.next(),
            Some("window,rank,country_name,confirmed_cases,deaths,days,fatality_ratio")
        );
        assert_eq!(
            lines.next(),
            Some("2020-08,1,\"Bonaire, Saint Eustatius and Saba\",40,2,31,0.05")
        );
    }

    #[test]
    fn monthly_export_carries_summed_country_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monthly.csv");
        let mut yemen_totals = BTreeMap::new();
        yemen_totals.insert("population".to_string(), 58323844.0);
        let mut chad_totals = BTreeMap::new();
        chad_totals.insert("population".to_string(), 15946882.0);
        chad_totals.insert("area_km2".to_string(), 1284000.0);
        let rows = vec![
            MonthlyRecord {
                country_name: "Yemen".to_string(),
                confirmed_cases: 15,
                deaths: 5,
                days: 2,
                other_totals: yemen_totals,
                fatality_ratio: 0.25,
            },
            MonthlyRecord {
                country_name: "Chad".to_string(),
                confirmed_cases: 10,
                deaths: 1,
                days: 1,
                other_totals: chad_totals,
                fatality_ratio: 0.1,
            },
        ];
        write_monthly_csv(&path, &rows, &DateWindow::default()).unwrap();

        let txt = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(
            lines[0],
            "window,rank,country_name,confirmed_cases,deaths,days,fatality_ratio,area_km2,population"
        );
        assert_eq!(lines[1], "2020-08,1,Yemen,15,5,2,0.25,,58323844");
        assert_eq!(lines[2], "2020-08,2,Chad,10,1,1,0.1,1284000,15946882");
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let err = write_region_csv(Path::new("/nonexistent-dir/region.csv"), &[]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
