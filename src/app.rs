//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and resolves the run configuration
//! - loads both datasets and runs the pipeline
//! - prints reports/charts
//! - writes optional exports

use clap::Parser;

use crate::cli::{AnalysisArgs, Command};
use crate::domain::{
    ASEAN_GEO_IDS, AnalysisConfig, DEFAULT_CASES_URL, DEFAULT_COUNTRIES_URL, DateWindow, parse_cli_date,
};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `covid` binary.
pub fn run() -> Result<(), AppError> {
    // `covid` and `covid --month 2020-05` behave like `covid report ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args, OutputMode::Full),
        Command::Rank(args) => handle_report(args, OutputMode::RankOnly),
        Command::Tui(args) => handle_tui(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    RankOnly,
}

fn handle_report(args: AnalysisArgs, mode: OutputMode) -> Result<(), AppError> {
    crate::logging::init_logging(args.quiet, args.debug);
    let config = analysis_config_from_args(&args)?;
    let run = pipeline::run_analysis(&config)?;

    match mode {
        OutputMode::Full => println!("{}", crate::report::format_run_report(&run, &config)),
        OutputMode::RankOnly => println!("{}", crate::report::format_rankings(&run, &config)),
    }

    if mode == OutputMode::Full && config.plot {
        let bars = crate::plot::fatality_bar_chart(&run.monthly, &config.window, config.nan_order);
        println!("{}", crate::plot::render_bar_chart(&bars, config.plot_width));

        let lines = crate::plot::cases_line_chart(&run.region_from_cutoff, &config.region_label);
        println!(
            "{}",
            crate::plot::render_line_chart(&lines, config.plot_width, config.plot_height)
        );
    }

    // Optional exports.
    if let Some(path) = &config.export_monthly {
        crate::io::write_monthly_csv(path, &run.monthly, &config.window)?;
        log::info!("Wrote {}", path.display());
    }
    if let Some(path) = &config.export_region {
        crate::io::write_region_csv(path, &run.region_from_cutoff)?;
        log::info!("Wrote {}", path.display());
    }

    Ok(())
}

fn handle_tui(args: AnalysisArgs) -> Result<(), AppError> {
    // Log lines would tear the alternate screen.
    crate::logging::init_logging(true, false);
    let config = analysis_config_from_args(&args)?;
    crate::tui::run(config)
}

/// Resolve CLI flags, environment (`.env` included) and built-in defaults.
pub fn analysis_config_from_args(args: &AnalysisArgs) -> Result<AnalysisConfig, AppError> {
    dotenvy::dotenv().ok();

    let cases_source = args
        .cases_url
        .clone()
        .or_else(|| std::env::var("COVID_CASES_URL").ok())
        .unwrap_or_else(|| DEFAULT_CASES_URL.to_string());
    let countries_source = args
        .countries_url
        .clone()
        .or_else(|| std::env::var("COVID_COUNTRIES_URL").ok())
        .unwrap_or_else(|| DEFAULT_COUNTRIES_URL.to_string());

    let region: Vec<String> = match &args.region {
        Some(codes) => codes
            .iter()
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .collect(),
        None => ASEAN_GEO_IDS.iter().map(|s| s.to_string()).collect(),
    };
    if region.is_empty() {
        return Err(AppError::usage("--region needs at least one country code."));
    }
    if args.top == 0 {
        return Err(AppError::usage("--top must be at least 1."));
    }

    Ok(AnalysisConfig {
        cases_source,
        countries_source,
        timeout_secs: args.timeout_secs,
        window: DateWindow::parse(&args.month)?,
        cutoff: parse_cli_date(&args.cutoff)?,
        region,
        region_label: args.region_label.clone(),
        top_n: args.top,
        nan_order: args.nan_order,
        head_rows: args.head,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_monthly: args.export_monthly.clone(),
        export_region: args.export_region.clone(),
    })
}

/// Rewrite argv so `covid` defaults to `covid report`.
///
/// Rules:
/// - `covid`                      -> `covid report`
/// - `covid --month 2020-05 ...`  -> `covid report --month 2020-05 ...`
/// - `covid --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "rank" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "report flags".
    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::domain::NanOrder;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_report() {
        assert_eq!(rewrite_args(argv(&["covid"])), argv(&["covid", "report"]));
        assert_eq!(
            rewrite_args(argv(&["covid", "--top", "5"])),
            argv(&["covid", "report", "--top", "5"])
        );
        assert_eq!(rewrite_args(argv(&["covid", "--help"])), argv(&["covid", "--help"]));
        assert_eq!(rewrite_args(argv(&["covid", "tui"])), argv(&["covid", "tui"]));
    }

    #[test]
    fn defaults_match_the_reference_analysis() {
        let cli = Cli::parse_from(argv(&["covid", "report", "--cases-url", "cases.json", "--countries-url", "c.json"]));
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        let config = analysis_config_from_args(&args).unwrap();
        assert_eq!(config.cases_source, "cases.json");
        assert_eq!(config.window.as_str(), "2020-08");
        assert_eq!(config.cutoff.to_string(), "2020-03-01");
        assert_eq!(config.region, vec!["ID", "MY", "SG", "TH", "VN"]);
        assert_eq!(config.top_n, 20);
        assert_eq!(config.nan_order, NanOrder::Last);
        assert!(config.plot);
    }

    #[test]
    fn region_list_is_normalized() {
        let cli = Cli::parse_from(argv(&["covid", "rank", "--region", "ph, id", "--nan-order", "first"]));
        let Command::Rank(args) = cli.command else {
            panic!("expected rank");
        };
        let config = analysis_config_from_args(&args).unwrap();
        assert_eq!(config.region, vec!["PH", "ID"]);
        assert_eq!(config.nan_order, NanOrder::First);
    }

    #[test]
    fn bad_window_is_usage_error() {
        let cli = Cli::parse_from(argv(&["covid", "report", "--month", "August"]));
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        let err = analysis_config_from_args(&args).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Usage);
    }
}
