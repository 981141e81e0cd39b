//! Date ordering and missing-value removal for the case table.

use crate::domain::{CaseRecord, CaseTable};

/// Per-column count of missing values, in table column order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MissingCounts(pub Vec<(String, usize)>);

impl MissingCounts {
    pub fn total(&self) -> usize {
        self.0.iter().map(|(_, n)| n).sum()
    }

    pub fn get(&self, column: &str) -> Option<usize> {
        self.0.iter().find(|(c, _)| c == column).map(|(_, n)| *n)
    }
}

/// Cleaning output: fully populated records plus before/after diagnostics.
#[derive(Debug, Clone)]
pub struct CleanedCases {
    pub records: Vec<CaseRecord>,
    pub columns: Vec<String>,
    pub missing_before: MissingCounts,
    pub missing_after: MissingCounts,
    pub rows_before: usize,
}

impl CleanedCases {
    pub fn rows_dropped(&self) -> usize {
        self.rows_before - self.records.len()
    }
}

pub fn count_missing(table: &CaseTable) -> MissingCounts {
    MissingCounts(
        table
            .columns
            .iter()
            .map(|c| (c.clone(), table.rows.iter().filter(|r| r.is_missing(c)).count()))
            .collect(),
    )
}

/// Stable-sort rows by date (missing dates last), then drop every row with a
/// missing value in any column.
pub fn clean_cases(table: &CaseTable) -> CleanedCases {
    let missing_before = count_missing(table);

    let mut rows = table.rows.clone();
    rows.sort_by_key(|r| (r.date.is_none(), r.date));

    let records: Vec<CaseRecord> = rows
        .into_iter()
        .filter_map(|r| r.into_record(&table.columns))
        .collect();

    let missing_after = MissingCounts(table.columns.iter().map(|c| (c.clone(), 0)).collect());

    log::info!(
        "Cleaning: {} -> {} rows ({} with missing values dropped)",
        table.n_rows(),
        records.len(),
        table.n_rows() - records.len()
    );

    CleanedCases {
        records,
        columns: table.columns.clone(),
        missing_before,
        missing_after,
        rows_before: table.n_rows(),
    }
}
