//! Top-N fatality ratio rankings: per row, and per country over a date window.

use std::collections::BTreeMap;

use crate::domain::{DateWindow, GlobalRankRow, MergedRecord, MonthlyRecord, NanOrder};
use crate::error::AppError;
use crate::transform::metric::{cmp_ratio_desc, fatality_ratio};

/// Rank every merged row by fatality ratio (descending, stable) and keep the first `top_n`.
pub fn rank_global(rows: &[MergedRecord], top_n: usize, nan_order: NanOrder) -> Vec<GlobalRankRow> {
    let mut sorted: Vec<&MergedRecord> = rows.iter().collect();
    sorted.sort_by(|a, b| cmp_ratio_desc(a.fatality_ratio, b.fatality_ratio, nan_order));

    sorted
        .into_iter()
        .take(top_n)
        .map(|r| GlobalRankRow {
            date: r.date,
            geo_id: r.geo_id.clone(),
            country_name: r.country_name.clone(),
            fatality_ratio: r.fatality_ratio,
        })
        .collect()
}

/// Sum rows per country name. Groups come out in ascending name order; rows
/// without a country name are dropped. A count total that does not fit in `i64`
/// is a data error.
pub fn aggregate_by_country<'a>(
    rows: impl IntoIterator<Item = &'a MergedRecord>,
) -> Result<Vec<MonthlyRecord>, AppError> {
    let mut groups: BTreeMap<&str, MonthlyRecord> = BTreeMap::new();
    let mut unnamed = 0usize;

    for r in rows {
        let Some(name) = r.country_name.as_deref() else {
            unnamed += 1;
            continue;
        };
        let entry = groups.entry(name).or_insert_with(|| MonthlyRecord {
            country_name: name.to_string(),
            confirmed_cases: 0,
            deaths: 0,
            days: 0,
            other_totals: BTreeMap::new(),
            fatality_ratio: f64::NAN,
        });
        entry.confirmed_cases = checked_total(entry.confirmed_cases, r.confirmed_cases, "confirmed_cases", name)?;
        entry.deaths = checked_total(entry.deaths, r.deaths, "deaths", name)?;
        entry.days += 1;
        for (key, value) in &r.extras {
            if let Some(v) = value.as_f64() {
                *entry.other_totals.entry(key.clone()).or_insert(0.0) += v;
            }
        }
    }

    if unnamed > 0 {
        log::warn!("{unnamed} rows without a country name left out of the aggregation");
    }

    Ok(groups
        .into_values()
        .map(|mut g| {
            g.fatality_ratio = fatality_ratio(g.deaths, g.confirmed_cases);
            g
        })
        .collect())
}

fn checked_total(total: i64, value: i64, column: &str, country: &str) -> Result<i64, AppError> {
    total
        .checked_add(value)
        .ok_or_else(|| AppError::schema(format!("{column} total for {country} overflows a 64-bit count.")))
}

/// Per-country totals for rows inside `window`, ranked by recomputed fatality
/// ratio, first `top_n` kept.
pub fn rank_window(
    rows: &[MergedRecord],
    window: &DateWindow,
    top_n: usize,
    nan_order: NanOrder,
) -> Result<Vec<MonthlyRecord>, AppError> {
    let in_window: Vec<&MergedRecord> = rows.iter().filter(|r| window.contains(r.date)).collect();
    if in_window.is_empty() {
        return Err(AppError::empty(format!("No records fall in window {window}.")));
    }
    log::info!("Window {window}: {} rows", in_window.len());

    let mut totals = aggregate_by_country(in_window)?;
    if totals.is_empty() {
        return Err(AppError::empty(format!("No named countries in window {window}.")));
    }
    totals.sort_by(|a, b| cmp_ratio_desc(a.fatality_ratio, b.fatality_ratio, nan_order));
    totals.truncate(top_n);
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Extras;
    use chrono::NaiveDate;

    fn merged(month: u32, day: u32, geo: &str, name: &str, cases: i64, deaths: i64) -> MergedRecord {
        let mut extras = Extras::new();
        extras.insert("population".to_string(), serde_json::json!(1000));
        MergedRecord {
            date: NaiveDate::from_ymd_opt(2020, month, day).unwrap(),
            geo_id: geo.to_string(),
            country_name: Some(name.to_string()),
            confirmed_cases: cases,
            deaths,
            fatality_ratio: fatality_ratio(deaths, cases),
            extras,
        }
    }

    #[test]
    fn global_ranking_is_descending_and_truncated() {
        let rows: Vec<MergedRecord> = (1..=25)
            .map(|i| merged(4, 1, &format!("C{i}"), &format!("Country {i}"), 100, i))
            .collect();

        let top = rank_global(&rows, 20, NanOrder::Last);
        assert_eq!(top.len(), 20);
        assert!(top.windows(2).all(|w| w[0].fatality_ratio >= w[1].fatality_ratio));
        assert_eq!(top[0].geo_id, "C25");

        let short = rank_global(&rows[..3], 20, NanOrder::Last);
        assert_eq!(short.len(), 3);
    }

    #[test]
    fn global_ranking_ties_keep_prior_order() {
        let rows = vec![
            merged(4, 1, "AA", "A", 10, 1),
            merged(4, 2, "BB", "B", 10, 1),
            merged(4, 3, "CC", "C", 0, 0),
            merged(4, 4, "DD", "D", 10, 2),
        ];
        let top = rank_global(&rows, 10, NanOrder::Last);
        let ids: Vec<&str> = top.iter().map(|r| r.geo_id.as_str()).collect();
        assert_eq!(ids, vec!["DD", "AA", "BB", "CC"]);

        let top = rank_global(&rows, 10, NanOrder::First);
        assert_eq!(top[0].geo_id, "CC");
    }

    #[test]
    fn window_sums_match_daily_rows() {
        let rows = vec![
            merged(7, 31, "ID", "Indonesia", 1000, 500),
            merged(8, 1, "ID", "Indonesia", 100, 5),
            merged(8, 2, "ID", "Indonesia", 200, 5),
            merged(8, 1, "YE", "Yemen", 10, 3),
            merged(8, 2, "YE", "Yemen", 10, 2),
            merged(9, 1, "YE", "Yemen", 10, 10),
        ];
        let window = DateWindow::parse("2020-08").unwrap();
        let ranked = rank_window(&rows, &window, 20, NanOrder::Last).unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].country_name, "Yemen");
        assert_eq!(ranked[0].confirmed_cases, 20);
        assert_eq!(ranked[0].deaths, 5);
        assert!((ranked[0].fatality_ratio - 0.25).abs() < 1e-12);
        assert_eq!(ranked[0].days, 2);

        let indonesia = &ranked[1];
        let raw_sum: i64 = rows
            .iter()
            .filter(|r| r.geo_id == "ID" && window.contains(r.date))
            .map(|r| r.confirmed_cases)
            .sum();
        assert_eq!(indonesia.confirmed_cases, raw_sum);
        assert_eq!(indonesia.other_totals.get("population"), Some(&2000.0));
    }

    #[test]
    fn empty_window_is_an_error() {
        let rows = vec![merged(7, 1, "ID", "Indonesia", 1, 0)];
        let window = DateWindow::parse("2020-08").unwrap();
        let err = rank_window(&rows, &window, 20, NanOrder::Last).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::EmptyResult);
    }

    #[test]
    fn groups_come_out_in_name_order() {
        let rows = vec![
            merged(8, 1, "VN", "Vietnam", 1, 0),
            merged(8, 1, "ID", "Indonesia", 1, 0),
            merged(8, 1, "MY", "Malaysia", 1, 0),
        ];
        let names: Vec<String> = aggregate_by_country(&rows).unwrap().into_iter().map(|g| g.country_name).collect();
        assert_eq!(names, vec!["Indonesia", "Malaysia", "Vietnam"]);
    }

    #[test]
    fn overflowing_totals_are_an_error() {
        let big = i64::MAX / 2 + 1;
        let rows = vec![
            merged(8, 1, "ID", "Indonesia", big, 0),
            merged(8, 2, "ID", "Indonesia", big, 0),
        ];
        let window = DateWindow::parse("2020-08").unwrap();
        let err = rank_window(&rows, &window, 20, NanOrder::Last).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Schema);
        assert!(err.to_string().contains("confirmed_cases total for Indonesia"));

        let deaths = vec![
            merged(8, 1, "ID", "Indonesia", 1, i64::MAX),
            merged(8, 2, "ID", "Indonesia", 1, 1),
        ];
        assert!(aggregate_by_country(&deaths).is_err());
    }
}
