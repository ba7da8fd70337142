//! Directory walker
//!
//! Discovers candidate source files under a scan root and runs the
//! classifier over each file in parallel. Per-file failures (permissions,
//! binary content, bad encoding) degrade to warnings; only a missing root
//! is fatal.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use crate::error::{ScanError, Warning};

use super::classifier::scan_content;
use super::types::{CallSite, ScanResult};

/// Directory names never descended into.
const SKIP_DIRS: &[&str] = &[
    "venv",
    ".venv",
    "node_modules",
    ".git",
    "__pycache__",
    "dist",
    "build",
    ".tox",
    "target",
];

pub(crate) const DEFAULT_EXTENSIONS: &[&str] = &["py"];

#[derive(Debug, Clone, Default)]
pub(crate) struct ScanOptions {
    /// File extensions to consider; defaults to `py` when empty.
    pub(crate) extensions: Vec<String>,
    pub(crate) quiet: bool,
    /// Cooperative cancellation: remaining files are abandoned promptly
    /// once set. Already-classified files stay in the result.
    pub(crate) cancel: Option<Arc<AtomicBool>>,
}

impl ScanOptions {
    fn extensions(&self) -> Vec<String> {
        if self.extensions.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
        } else {
            self.extensions.clone()
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Walk `root` and classify every matching call site.
///
/// Output ordering is stable for a given filesystem state: call sites are
/// sorted by `(file_path, line_number)` regardless of discovery or thread
/// scheduling order.
pub(crate) fn scan(root: &Path, options: &ScanOptions) -> Result<ScanResult, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotFound {
            path: root.to_path_buf(),
        });
    }

    let discovery_start = Instant::now();
    let files = find_files(root, &options.extensions());
    if !options.quiet {
        eprintln!(
            "Scanning {} files under {}... ({:.2}ms)",
            files.len(),
            root.display(),
            discovery_start.elapsed().as_secs_f64() * 1000.0
        );
    }

    let per_file: Vec<(Vec<CallSite>, Option<Warning>)> = files
        .par_iter()
        .map(|path| {
            if options.cancelled() {
                return (Vec::new(), None);
            }
            match fs::read_to_string(path) {
                Ok(content) => (scan_content(&rel_path(root, path), &content), None),
                Err(err) => (
                    Vec::new(),
                    Some(Warning::UnreadableFile {
                        path: path.clone(),
                        reason: err.to_string(),
                    }),
                ),
            }
        })
        .collect();

    let mut result = ScanResult {
        files_scanned: files.len(),
        ..ScanResult::default()
    };
    for (calls, warning) in per_file {
        result.call_sites.extend(calls);
        result.warnings.extend(warning);
    }
    result
        .call_sites
        .sort_by(|a, b| (a.file_path.as_str(), a.line_number).cmp(&(b.file_path.as_str(), b.line_number)));

    if !options.quiet {
        eprintln!(
            "Found {} call sites in {} files",
            result.call_sites.len(),
            result.touched_files().len()
        );
    }
    Ok(result)
}

fn find_files(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for ext in extensions {
        let pattern = format!("{}/**/*.{}", root.display(), ext);
        if let Ok(entries) = glob::glob(&pattern) {
            for entry in entries.flatten() {
                if !in_skipped_dir(&entry) {
                    files.push(entry);
                }
            }
        }
    }
    files.sort();
    files.dedup();
    files
}

fn in_skipped_dir(path: &Path) -> bool {
    path.components().any(|component| {
        component
            .as_os_str()
            .to_str()
            .is_some_and(|name| SKIP_DIRS.contains(&name))
    })
}

fn rel_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
