//! Shared analysis pipeline used by the report, rank and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> clean -> join (+ fatality ratio) -> rankings -> region slices
//!
//! The front-ends then focus on presentation (printing vs widgets).

use crate::data::{DatasetClient, RawTables};
use crate::domain::{AnalysisConfig, FirstCase, GlobalRankRow, MergedRecord, MonthlyRecord};
use crate::error::AppError;
use crate::transform::{self, CleanedCases};

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub raw: RawTables,
    pub cleaned: CleanedCases,
    pub merged: Vec<MergedRecord>,
    pub global: Vec<GlobalRankRow>,
    pub monthly: Vec<MonthlyRecord>,
    pub region: Vec<MergedRecord>,
    pub region_names: Vec<String>,
    pub first_cases: Vec<FirstCase>,
    pub region_from_cutoff: Vec<MergedRecord>,
}

/// Fetch both datasets and run the full pipeline.
pub fn run_analysis(config: &AnalysisConfig) -> Result<RunOutput, AppError> {
    validate(config)?;
    let client = DatasetClient::new(config.timeout_secs)?;
    let raw = client.fetch_tables(config)?;
    run_analysis_with_tables(config, raw)
}

/// Run the pipeline over already-loaded tables.
pub fn run_analysis_with_tables(config: &AnalysisConfig, raw: RawTables) -> Result<RunOutput, AppError> {
    validate(config)?;

    let cleaned = transform::clean_cases(&raw.cases);
    let merged = transform::join_countries(&cleaned.records, &raw.countries);

    let global = transform::rank_global(&merged, config.top_n, config.nan_order);
    let monthly = transform::rank_window(&merged, &config.window, config.top_n, config.nan_order)?;

    let region = transform::filter_region(&merged, &config.region)?;
    let region_names = transform::unique_country_names(&region);
    let first_cases = transform::first_cases(&region, &config.region);
    let region_from_cutoff = transform::filter_from(&region, config.cutoff)?;

    Ok(RunOutput {
        raw,
        cleaned,
        merged,
        global,
        monthly,
        region,
        region_names,
        first_cases,
        region_from_cutoff,
    })
}

/// Recompute only the window ranking, e.g. after the window changed.
pub fn rerank_window(run: &RunOutput, config: &AnalysisConfig) -> Result<Vec<MonthlyRecord>, AppError> {
    transform::rank_window(&run.merged, &config.window, config.top_n, config.nan_order)
}

fn validate(config: &AnalysisConfig) -> Result<(), AppError> {
    if config.top_n == 0 {
        return Err(AppError::usage("Top-N must be at least 1."));
    }
    if config.region.is_empty() {
        return Err(AppError::usage("Region must name at least one country code."));
    }
    Ok(())
}
