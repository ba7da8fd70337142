//! Source scanning layer
//!
//! Walks a directory tree, applies the pattern rule set to each text file,
//! and classifies matches into call-site records. Detection is regex-based
//! and deliberately not a parser: each record carries a confidence score
//! instead of pretending source-level correctness.

pub(crate) mod classifier;
pub(crate) mod rules;
pub(crate) mod types;
pub(crate) mod walker;

pub(crate) use types::{CallSite, Category, ScanResult};
pub(crate) use walker::{ScanOptions, scan};
