//! Reporting: text tables for every pipeline stage.

pub mod format;

pub use format::*;
