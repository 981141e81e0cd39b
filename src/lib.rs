//! `covid-eda` library crate.
//!
//! The binary (`covid`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes or touching the network
//! - the report and the TUI share one implementation of every step

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod transform;
pub mod tui;
