//! Call-site classifier
//!
//! Turns raw rule matches into `CallSite` records: resolves the category,
//! extracts a model identifier from the call's argument region, and scores
//! how unambiguous the match was. Extraction is best-effort by design; a
//! malformed region never fails, it only costs confidence.

use std::sync::OnceLock;

use regex::Regex;

use super::rules::{PatternRule, anchor_matches, has_openai_import, match_rule};
use super::types::{CallSite, Category};

/// Trailing lines of context considered per anchor. Bounds worst-case cost
/// on pathological files.
pub(crate) const CONTEXT_WINDOW_LINES: usize = 15;

/// Longest snippet carried into the report.
const SNIPPET_MAX_LINES: usize = 6;

/// Embedding call sites usually take the model from shared client config
/// rather than inline, so an absent literal defaults to the model that
/// dominates embedding usage in practice. Explicit fallback, not a guess
/// the caller can't see: the confidence penalty still applies.
pub(crate) const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

const ANCHOR_LINE_MODEL_BONUS: f64 = 0.05;
const MISSING_MODEL_PENALTY: f64 = 0.2;
const MULTI_LINE_PENALTY: f64 = 0.1;
const COMMENTED_PENALTY: f64 = 0.3;
const NO_IMPORT_PENALTY: f64 = 0.15;

/// Scan one file's content for call sites. `rel_path` is stored verbatim on
/// each record.
pub(crate) fn scan_content(rel_path: &str, content: &str) -> Vec<CallSite> {
    let lines: Vec<&str> = content.lines().collect();
    let has_import = has_openai_import(content);

    let mut calls = Vec::new();
    for index in 0..lines.len() {
        if !anchor_matches(lines[index]) {
            continue;
        }
        // Window predicates only see the call's own argument region: the
        // anchor line through the balancing close paren, capped at K lines.
        let close_offset = closing_offset(&lines, index, CONTEXT_WINDOW_LINES);
        let window = lines[index..=index + close_offset].join("\n");
        if let Some(rule) = match_rule(lines[index], &window) {
            calls.push(classify(rel_path, &lines, index, rule, close_offset, has_import));
        }
    }
    calls
}

/// Build a `CallSite` from an anchor match. Never fails; the floor is
/// `confidence = 0.0` with an absent model.
fn classify(
    rel_path: &str,
    lines: &[&str],
    index: usize,
    rule: &PatternRule,
    close_offset: usize,
    has_import: bool,
) -> CallSite {
    let (model_id, on_anchor_line) = extract_model(lines, index, close_offset);

    let mut confidence = rule.base_confidence;
    if on_anchor_line {
        confidence += ANCHOR_LINE_MODEL_BONUS;
    }
    if model_id.is_none() {
        confidence -= MISSING_MODEL_PENALTY;
    }
    if close_offset > 1 {
        confidence -= MULTI_LINE_PENALTY;
    }
    if looks_commented_or_quoted(lines[index], rule.anchor_start(lines[index])) {
        confidence -= COMMENTED_PENALTY;
    }
    if !has_import {
        confidence -= NO_IMPORT_PENALTY;
    }

    let model_id = match (model_id, rule.category) {
        (Some(model), _) => Some(model),
        (None, Category::Embedding) => Some(DEFAULT_EMBEDDING_MODEL.to_string()),
        (None, _) => None,
    };

    CallSite {
        file_path: rel_path.to_string(),
        line_number: index + 1,
        category: rule.category,
        raw_snippet: snippet(lines, index, close_offset),
        model_id,
        confidence: confidence.clamp(0.0, 1.0),
    }
}

/// Offset of the line on which the call's parentheses balance out, 0 for a
/// single-line call. Capped at `max` lines below the anchor.
fn closing_offset(lines: &[&str], index: usize, max: usize) -> usize {
    let mut depth: i32 = 0;
    let mut seen_open = false;
    let last = (index + max).min(lines.len() - 1);
    for (offset, line) in lines[index..=last].iter().enumerate() {
        for ch in line.chars() {
            match ch {
                '(' => {
                    depth += 1;
                    seen_open = true;
                }
                ')' => depth -= 1,
                _ => {}
            }
        }
        if seen_open && depth <= 0 {
            return offset;
        }
    }
    last - index
}

fn model_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            // model="gpt-4" / model='gpt-4'
            Regex::new(r#"model\s*=\s*["']([^"']+)["']"#).unwrap(),
            // model: "gpt-4" (dict-style keyword)
            Regex::new(r#"model\s*:\s*["']([^"']+)["']"#).unwrap(),
            // "model": "gpt-4" (payload dict)
            Regex::new(r#""model"\s*:\s*["']([^"']+)["']"#).unwrap(),
            // model=MODEL_VAR; yields the identifier, which the pricing
            // layer will report as unresolved
            Regex::new(r"model\s*=\s*([A-Za-z_][A-Za-z0-9_]*)\b").unwrap(),
        ]
    })
}

/// Look for a model argument, preferring a candidate on the anchor line.
/// Returns `(model, found_on_anchor_line)`.
fn extract_model(lines: &[&str], index: usize, close_offset: usize) -> (Option<String>, bool) {
    if let Some(model) = first_model_in(lines[index]) {
        return (Some(model), true);
    }

    let last = (index + close_offset).min(lines.len() - 1);
    for line in &lines[index + 1..=last] {
        if let Some(model) = first_model_in(line) {
            return (Some(model), false);
        }
    }
    (None, false)
}

fn first_model_in(line: &str) -> Option<String> {
    model_patterns()
        .iter()
        .find_map(|re| re.captures(line).map(|c| c[1].to_string()))
}

/// Cheap heuristic for a match inside a comment or string literal. Not a
/// tokenizer: an odd number of quotes before the anchor is taken as "inside
/// a string".
fn looks_commented_or_quoted(line: &str, anchor_start: Option<usize>) -> bool {
    if line.trim_start().starts_with('#') {
        return true;
    }
    let Some(start) = anchor_start else {
        return false;
    };
    let prefix = &line[..start];
    prefix.matches('"').count() % 2 == 1 || prefix.matches('\'').count() % 2 == 1
}

fn snippet(lines: &[&str], index: usize, close_offset: usize) -> String {
    let take = close_offset.min(SNIPPET_MAX_LINES - 1);
    let last = (index + take).min(lines.len() - 1);
    lines[index..=last].join("\n")
}
