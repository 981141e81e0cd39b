//! Command-line parsing for the COVID-19 analysis tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline code. Every option defaults to the values of the reference analysis
//! (2020-08 ranking, ASEAN region, 2020-03-01 cutoff, top 20).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::NanOrder;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "covid", version, about = "COVID-19 fatality ratio analysis (world and regional)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the full report (dataset summaries, rankings, regional tables) and ASCII charts.
    Report(AnalysisArgs),
    /// Print the global and window rankings only (useful for scripting).
    Rank(AnalysisArgs),
    /// Launch the interactive chart viewer.
    Tui(AnalysisArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Parser, Clone)]
pub struct AnalysisArgs {
    /// Case/death dataset (http(s) URL, file:// URL or path). Falls back to $COVID_CASES_URL.
    #[arg(long)]
    pub cases_url: Option<String>,

    /// Country metadata dataset. Falls back to $COVID_COUNTRIES_URL.
    #[arg(long)]
    pub countries_url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Window for the per-country ranking: YYYY, YYYY-MM or YYYY-MM-DD.
    #[arg(short = 'm', long, default_value = "2020-08")]
    pub month: String,

    /// First date (YYYY-MM-DD) of the regional time series.
    #[arg(long, default_value = "2020-03-01")]
    pub cutoff: String,

    /// Region country codes, comma separated [default: ID,MY,SG,TH,VN].
    #[arg(short = 'r', long, value_delimiter = ',')]
    pub region: Option<Vec<String>>,

    /// Display name of the region.
    #[arg(long, default_value = "ASEAN")]
    pub region_label: String,

    /// Number of rows kept in each ranking.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Where undefined (0/0) fatality ratios go in rankings.
    #[arg(long, value_enum, default_value_t = NanOrder::Last)]
    pub nan_order: NanOrder,

    /// Rows shown in table previews.
    #[arg(long, default_value_t = 5)]
    pub head: usize,

    /// Disable the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the window ranking to CSV.
    #[arg(long)]
    pub export_monthly: Option<PathBuf>,

    /// Export the regional series (from the cutoff on) to CSV.
    #[arg(long)]
    pub export_region: Option<PathBuf>,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Log debug details.
    #[arg(long)]
    pub debug: bool,
}
