//! Pattern rule set for OpenAI call-site detection
//!
//! A fixed, priority-ordered table of call-site signatures. Rules are
//! evaluated first-match-wins so a single span is never counted under two
//! categories. Regex matching over a small line window is an approximation
//! of parsing; the confidence weight on each rule is the documented
//! admission of that.

use std::sync::OnceLock;

use regex::Regex;

use super::types::Category;

pub(crate) struct PatternRule {
    pub(crate) category: Category,
    /// Matched against the anchor line alone.
    anchor: Regex,
    /// Matched against the anchor line plus the trailing context window.
    window: Option<Regex>,
    pub(crate) base_confidence: f64,
}

impl PatternRule {
    pub(crate) fn matches(&self, line: &str, window: &str) -> bool {
        if !self.anchor.is_match(line) {
            return false;
        }
        match &self.window {
            Some(re) => re.is_match(window),
            None => true,
        }
    }

    /// Byte offset of the anchor match on its line, for the
    /// comment/string heuristic.
    pub(crate) fn anchor_start(&self, line: &str) -> Option<usize> {
        self.anchor.find(line).map(|m| m.start())
    }
}

/// Cheap pre-check: does any rule anchor match this line at all? Lets the
/// scanner skip window assembly for the common no-match case.
pub(crate) fn anchor_matches(line: &str) -> bool {
    rules().iter().any(|rule| rule.anchor.is_match(line))
}

/// Rule table in priority order. More specific rules come first and carry
/// higher base confidence.
pub(crate) fn rules() -> &'static [PatternRule] {
    static RULES: OnceLock<Vec<PatternRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            PatternRule {
                category: Category::Streaming,
                anchor: Regex::new(r"(?:openai|client)\.chat\.completions\.create").unwrap(),
                window: Some(Regex::new(r"stream\s*=\s*True").unwrap()),
                base_confidence: 0.95,
            },
            PatternRule {
                category: Category::FunctionCalling,
                anchor: Regex::new(r"(?:openai|client)\.chat\.completions\.create").unwrap(),
                window: Some(Regex::new(r"\b(?:tools|functions)\s*=").unwrap()),
                base_confidence: 0.9,
            },
            PatternRule {
                category: Category::Chat,
                anchor: Regex::new(r"(?:openai|client)\.chat\.completions\.create").unwrap(),
                window: None,
                base_confidence: 0.9,
            },
            PatternRule {
                category: Category::Embedding,
                anchor: Regex::new(r"(?:openai|client)\.embeddings\.create").unwrap(),
                window: None,
                base_confidence: 0.9,
            },
            // Legacy Completions API; migrates to the chat endpoint, so it
            // classifies as chat at reduced confidence.
            PatternRule {
                category: Category::Chat,
                anchor: Regex::new(r"(?:openai|client)\.completions\.create").unwrap(),
                window: None,
                base_confidence: 0.7,
            },
            // Catch-all for vendor calls none of the rules above place.
            // Kept as `unknown` so the total match count stays stable.
            PatternRule {
                category: Category::Unknown,
                anchor: Regex::new(r"(?:openai|client)\.[a-z_]+(?:\.[a-z_]+)*\.create").unwrap(),
                window: None,
                base_confidence: 0.3,
            },
        ]
    })
}

/// First rule matching the anchor line (with the trailing window available
/// to window predicates), in priority order.
pub(crate) fn match_rule(line: &str, window: &str) -> Option<&'static PatternRule> {
    rules().iter().find(|rule| rule.matches(line, window))
}

/// File-level prefilter: does the content import the OpenAI SDK anywhere?
/// Matches in files without an import are kept but penalized.
pub(crate) fn has_openai_import(content: &str) -> bool {
    static IMPORT_RE: OnceLock<Regex> = OnceLock::new();
    IMPORT_RE
        .get_or_init(|| Regex::new(r"(?m)^\s*(?:from\s+openai\s+import\b|import\s+openai\b)").unwrap())
        .is_match(content)
}
