//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw and cleaned case rows (`CaseRow`, `CaseRecord`) and country metadata (`CountryInfo`)
//! - joined/derived rows (`MergedRecord`, `MonthlyRecord`, `GlobalRankRow`, `FirstCase`)
//! - run settings (`AnalysisConfig`, `DateWindow`, `NanOrder`)

pub mod types;

pub use types::*;
