use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Where a table (or entry) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TableSource {
    Live,
    Fallback,
}

/// Normalized cost facts for one model (per token, not per million).
/// Prompt and completion costs are set independently, never inferred from
/// one another.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PricingEntry {
    pub(crate) model_id: String,
    pub(crate) prompt_cost_per_token: f64,
    pub(crate) completion_cost_per_token: f64,
    /// Informational only; 0 when the upstream omits it.
    pub(crate) context_length: u64,
    pub(crate) source: TableSource,
}

impl PricingEntry {
    /// Cost of one request mix against this entry.
    pub(crate) fn cost(&self, prompt_tokens: f64, completion_tokens: f64) -> f64 {
        prompt_tokens * self.prompt_cost_per_token
            + completion_tokens * self.completion_cost_per_token
    }
}

/// Snapshot of upstream pricing, keyed by model id. Owned by the cache;
/// callers always receive it behind an `Arc` so a refresh can never mutate
/// a table mid-read.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct PricingTable {
    pub(crate) models: HashMap<String, PricingEntry>,
    pub(crate) fetched_at: DateTime<Utc>,
    pub(crate) source: TableSource,
}

impl PricingTable {
    pub(crate) fn get(&self, model_id: &str) -> Option<&PricingEntry> {
        self.models.get(model_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.models.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_cost_is_linear_in_tokens() {
        let entry = PricingEntry {
            model_id: "openai/gpt-4".to_string(),
            prompt_cost_per_token: 0.00003,
            completion_cost_per_token: 0.00006,
            context_length: 8192,
            source: TableSource::Live,
        };
        let cost = entry.cost(1_000_000.0, 500_000.0);
        assert!((cost - 60.0).abs() < 1e-9);
    }

    #[test]
    fn table_source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TableSource::Fallback).unwrap(),
            "\"fallback\""
        );
    }
}
