//! Dataset loading.
//!
//! - retrieval over HTTP(S) or from disk (`source`)
//! - JSON -> typed tables, with schema checks (`parse`)

pub mod parse;
pub mod source;

pub use parse::*;
pub use source::*;
