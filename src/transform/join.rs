//! Inner join of cleaned cases with country metadata.

use std::collections::HashMap;

use crate::domain::{CaseRecord, CountryInfo, MergedRecord};
use crate::transform::metric::fatality_ratio;

/// Join cases to countries on `geo_id` and derive the fatality ratio.
///
/// Cases whose `geo_id` has no country are dropped. Output keeps case order per
/// match and is stable-sorted by date.
pub fn join_countries(cases: &[CaseRecord], countries: &[CountryInfo]) -> Vec<MergedRecord> {
    let mut index: HashMap<&str, Vec<&CountryInfo>> = HashMap::new();
    for c in countries {
        index.entry(c.geo_id.as_str()).or_default().push(c);
    }
    for (geo_id, matches) in &index {
        if matches.len() > 1 {
            log::warn!("geo_id {geo_id} appears {} times in country data", matches.len());
        }
    }

    let mut out = Vec::with_capacity(cases.len());
    let mut unmatched = 0usize;
    for case in cases {
        let Some(matches) = index.get(case.geo_id.as_str()) else {
            unmatched += 1;
            continue;
        };
        for country in matches {
            out.push(merge(case, country));
        }
    }

    out.sort_by_key(|r| r.date);

    if unmatched > 0 {
        log::debug!("Join: {unmatched} case rows had no matching country");
    }
    log::info!("Join: {} case rows -> {} merged rows", cases.len(), out.len());

    out
}

fn merge(case: &CaseRecord, country: &CountryInfo) -> MergedRecord {
    let mut extras = case.extras.clone();
    for (key, value) in &country.extras {
        let clashes = extras.contains_key(key)
            || matches!(key.as_str(), "date" | "geo_id" | "confirmed_cases" | "deaths");
        let key = if clashes { format!("{key}_country") } else { key.clone() };
        extras.insert(key, value.clone());
    }

    MergedRecord {
        date: case.date,
        geo_id: case.geo_id.clone(),
        country_name: country.country_name.clone(),
        confirmed_cases: case.confirmed_cases,
        deaths: case.deaths,
        fatality_ratio: fatality_ratio(case.deaths, case.confirmed_cases),
        extras,
    }
}
