//! Core scan result types
//!
//! A scan turns raw source text into a flat list of classified call sites
//! plus the soft warnings collected along the way.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Warning;

/// Functional class of a detected call site. Closed set; anything the rule
/// table cannot place lands in `Unknown` rather than being dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Category {
    Chat,
    Streaming,
    Embedding,
    FunctionCalling,
    Unknown,
}

impl Category {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Category::Chat => "chat",
            Category::Streaming => "streaming",
            Category::Embedding => "embedding",
            Category::FunctionCalling => "function_calling",
            Category::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One detected API invocation. Created once per scan pass, immutable
/// thereafter.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CallSite {
    /// Path relative to the scan root.
    pub(crate) file_path: String,
    /// 1-based line of the call's opening token.
    pub(crate) line_number: usize,
    pub(crate) category: Category,
    /// Minimal span needed to render a before/after example.
    pub(crate) raw_snippet: String,
    /// Absent when extraction failed; embedding calls default to
    /// `text-embedding-ada-002` (see classifier).
    pub(crate) model_id: Option<String>,
    /// How unambiguous the match was, in [0, 1].
    pub(crate) confidence: f64,
}

/// Everything a single scan pass produced.
#[derive(Debug, Default)]
pub(crate) struct ScanResult {
    pub(crate) call_sites: Vec<CallSite>,
    pub(crate) warnings: Vec<Warning>,
    pub(crate) files_scanned: usize,
}

impl ScanResult {
    /// Call counts per category, for the report summary.
    pub(crate) fn category_counts(&self) -> HashMap<Category, usize> {
        let mut counts = HashMap::new();
        for call in &self.call_sites {
            *counts.entry(call.category).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct files containing at least one call site, sorted.
    pub(crate) fn touched_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self
            .call_sites
            .iter()
            .map(|c| c.file_path.as_str())
            .collect();
        files.sort_unstable();
        files.dedup();
        files
    }
}
