//! Pipeline transformations, one step per module.
//!
//! clean -> join (+ metric) -> rank / region

pub mod clean;
pub mod join;
pub mod metric;
pub mod rank;
pub mod region;

pub use clean::{CleanedCases, MissingCounts, clean_cases, count_missing};
pub use join::join_countries;
pub use metric::{cmp_ratio_desc, fatality_ratio};
pub use rank::{aggregate_by_country, rank_global, rank_window};
pub use region::{filter_from, filter_region, first_cases, unique_country_names};
