//! Savings calculator
//!
//! Pure cost arithmetic over a usage-weighted model distribution. No clock,
//! no hidden state: identical inputs produce identical output, which is why
//! the distribution is kept in a `BTreeMap` (stable accumulation order).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::SavingsError;
use crate::pricing::{PricingEntry, PricingTable, fallback_entry, mistral_equivalent, openrouter_id};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Caller-supplied traffic weights per model. Weights must sum to 1.0
/// within tolerance; the calculator fails fast instead of renormalizing.
#[derive(Debug, Clone, Default)]
pub(crate) struct UsageDistribution(BTreeMap<String, f64>);

impl UsageDistribution {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 100% of traffic on one model.
    pub(crate) fn single(model: &str) -> Self {
        let mut dist = Self::new();
        dist.set(model, 1.0);
        dist
    }

    pub(crate) fn set(&mut self, model: &str, weight: f64) {
        self.0.insert(model.to_string(), weight);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn validate(&self) -> Result<(), SavingsError> {
        let sum: f64 = self.0.values().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(SavingsError::InvalidDistribution { sum });
        }
        Ok(())
    }
}

impl<const N: usize> From<[(&str, f64); N]> for UsageDistribution {
    fn from(pairs: [(&str, f64); N]) -> Self {
        let mut dist = Self::new();
        for (model, weight) in pairs {
            dist.set(model, weight);
        }
        dist
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct TokenVolume {
    pub(crate) prompt_tokens: u64,
    pub(crate) completion_tokens: u64,
}

/// Assumed when the caller supplies no volume: a moderate monthly workload.
pub(crate) const DEFAULT_MONTHLY_VOLUME: TokenVolume = TokenVolume {
    prompt_tokens: 5_000_000,
    completion_tokens: 5_000_000,
};

/// Deterministic cost comparison. Recomputed fresh on every call; cheap and
/// caller-volume dependent, so never cached.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SavingsResult {
    pub(crate) source_cost: f64,
    pub(crate) target_cost: f64,
    pub(crate) savings_amount: f64,
    pub(crate) savings_percentage: f64,
    pub(crate) source_breakdown: BTreeMap<String, f64>,
    pub(crate) target_breakdown: BTreeMap<String, f64>,
    /// Models absent from both live and fallback pricing (or without a
    /// migration target); contribute zero to both sides.
    pub(crate) unresolved_models: Vec<String>,
}

/// Cost both sides of the migration for the given usage mix.
pub(crate) fn estimate<F>(
    usage: &UsageDistribution,
    volume: TokenVolume,
    pricing: &PricingTable,
    target_mapping: F,
) -> Result<SavingsResult, SavingsError>
where
    F: Fn(&str) -> Option<String>,
{
    usage.validate()?;

    let prompt_total = volume.prompt_tokens as f64;
    let completion_total = volume.completion_tokens as f64;

    let mut source_cost = 0.0;
    let mut target_cost = 0.0;
    let mut source_breakdown = BTreeMap::new();
    let mut target_breakdown = BTreeMap::new();
    let mut unresolved_models = Vec::new();

    for (model, weight) in &usage.0 {
        let source_entry = resolve(model, pricing);
        let target_entry = target_mapping(model).and_then(|target| resolve(&target, pricing));

        // A pair we cannot price on both sides would skew the comparison;
        // it contributes zero and is reported instead.
        let (Some(source_entry), Some(target_entry)) = (source_entry, target_entry) else {
            unresolved_models.push(model.clone());
            continue;
        };

        let prompt_tokens = prompt_total * weight;
        let completion_tokens = completion_total * weight;

        let model_source_cost = source_entry.cost(prompt_tokens, completion_tokens);
        let model_target_cost = target_entry.cost(prompt_tokens, completion_tokens);
        source_cost += model_source_cost;
        target_cost += model_target_cost;
        source_breakdown.insert(model.clone(), model_source_cost);
        target_breakdown.insert(model.clone(), model_target_cost);
    }

    let savings_amount = source_cost - target_cost;
    let savings_percentage = if source_cost > 0.0 {
        savings_amount / source_cost * 100.0
    } else {
        0.0
    };

    Ok(SavingsResult {
        source_cost,
        target_cost,
        savings_amount,
        savings_percentage,
        source_breakdown,
        target_breakdown,
        unresolved_models,
    })
}

/// `estimate` with the built-in OpenAI → Mistral target mapping.
pub(crate) fn estimate_migration(
    usage: &UsageDistribution,
    volume: TokenVolume,
    pricing: &PricingTable,
) -> Result<SavingsResult, SavingsError> {
    estimate(usage, volume, pricing, |model| {
        mistral_equivalent(model).map(str::to_string)
    })
}

/// Resolve a model id against the live table first, then the catalog-id
/// alias, then the hand-maintained fallback entries.
fn resolve(model_id: &str, pricing: &PricingTable) -> Option<PricingEntry> {
    if let Some(entry) = pricing.get(model_id) {
        return Some(entry.clone());
    }
    if let Some(catalog_id) = openrouter_id(model_id) {
        if let Some(entry) = pricing.get(catalog_id) {
            return Some(entry.clone());
        }
        if let Some(entry) = fallback_entry(catalog_id) {
            return Some(entry);
        }
    }
    fallback_entry(model_id)
}

/// Side-by-side comparison of one OpenAI model and its Mistral equivalent,
/// per 1M tokens split evenly between prompt and completion.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ModelComparison {
    pub(crate) source_model: String,
    pub(crate) target_model: String,
    pub(crate) source_cost_per_1m: f64,
    pub(crate) target_cost_per_1m: f64,
    pub(crate) savings_per_1m: f64,
    pub(crate) savings_percentage: f64,
}

pub(crate) fn compare(model: &str, pricing: &PricingTable) -> Option<ModelComparison> {
    let target = mistral_equivalent(model)?;
    let source_entry = resolve(model, pricing)?;
    let target_entry = resolve(target, pricing)?;

    let source_cost_per_1m = source_entry.cost(500_000.0, 500_000.0);
    let target_cost_per_1m = target_entry.cost(500_000.0, 500_000.0);
    let savings_per_1m = source_cost_per_1m - target_cost_per_1m;
    let savings_percentage = if source_cost_per_1m > 0.0 {
        savings_per_1m / source_cost_per_1m * 100.0
    } else {
        0.0
    };

    Some(ModelComparison {
        source_model: source_entry.model_id,
        target_model: target_entry.model_id,
        source_cost_per_1m,
        target_cost_per_1m,
        savings_per_1m,
        savings_percentage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::TableSource;
    use chrono::Utc;
    use std::collections::HashMap;

    fn entry(model_id: &str, prompt: f64, completion: f64) -> PricingEntry {
        PricingEntry {
            model_id: model_id.to_string(),
            prompt_cost_per_token: prompt,
            completion_cost_per_token: completion,
            context_length: 0,
            source: TableSource::Live,
        }
    }

    fn table(entries: Vec<PricingEntry>) -> PricingTable {
        let mut models = HashMap::new();
        for e in entries {
            models.insert(e.model_id.clone(), e);
        }
        PricingTable {
            models,
            fetched_at: Utc::now(),
            source: TableSource::Live,
        }
    }

    fn gpt4_table() -> PricingTable {
        table(vec![
            entry("openai/gpt-4", 0.00003, 0.00006),
            entry("mistralai/mistral-large", 0.000008, 0.000024),
        ])
    }

    #[test]
    fn reference_gpt4_migration_figures() {
        let usage = UsageDistribution::single("gpt-4");
        let volume = TokenVolume {
            prompt_tokens: 5_000_000,
            completion_tokens: 5_000_000,
        };
        let result = estimate_migration(&usage, volume, &gpt4_table()).unwrap();
        assert!((result.source_cost - 450.0).abs() < 1e-9);
        assert!((result.target_cost - 160.0).abs() < 1e-9);
        assert!((result.savings_amount - 290.0).abs() < 1e-9);
        assert!((result.savings_percentage - 64.4).abs() < 0.1);
        assert!(result.unresolved_models.is_empty());
    }

    #[test]
    fn half_weights_are_rejected() {
        let usage = UsageDistribution::from([("gpt-4", 0.5)]);
        let volume = DEFAULT_MONTHLY_VOLUME;
        let err = estimate_migration(&usage, volume, &gpt4_table()).unwrap_err();
        assert!(matches!(err, SavingsError::InvalidDistribution { sum } if (sum - 0.5).abs() < 1e-9));
    }

    #[test]
    fn deterministic_across_calls() {
        let usage = UsageDistribution::from([("gpt-4", 0.6), ("gpt-3.5-turbo", 0.4)]);
        let pricing = table(vec![
            entry("openai/gpt-4", 0.00003, 0.00006),
            entry("openai/gpt-3.5-turbo", 0.0000005, 0.0000015),
            entry("mistralai/mistral-large", 0.000008, 0.000024),
            entry("mistralai/mistral-small", 0.000001, 0.000003),
        ]);
        let a = estimate_migration(&usage, DEFAULT_MONTHLY_VOLUME, &pricing).unwrap();
        let b = estimate_migration(&usage, DEFAULT_MONTHLY_VOLUME, &pricing).unwrap();
        assert_eq!(a.source_cost.to_bits(), b.source_cost.to_bits());
        assert_eq!(a.target_cost.to_bits(), b.target_cost.to_bits());
        assert_eq!(a.savings_percentage.to_bits(), b.savings_percentage.to_bits());
    }

    #[test]
    fn unknown_models_contribute_zero_with_note() {
        let usage = UsageDistribution::single("totally-unknown-model");
        let result =
            estimate_migration(&usage, DEFAULT_MONTHLY_VOLUME, &table(Vec::new())).unwrap();
        assert_eq!(result.source_cost, 0.0);
        assert_eq!(result.target_cost, 0.0);
        assert_eq!(result.savings_percentage, 0.0);
        assert_eq!(result.unresolved_models, vec!["totally-unknown-model"]);
    }

    #[test]
    fn fallback_entries_cover_an_empty_live_table() {
        // Nothing live, but gpt-4 and mistral-large exist in the fallback
        // rates, so the estimate still resolves.
        let usage = UsageDistribution::single("gpt-4");
        let result =
            estimate_migration(&usage, DEFAULT_MONTHLY_VOLUME, &table(Vec::new())).unwrap();
        assert!(result.source_cost > 0.0);
        assert!(result.unresolved_models.is_empty());
    }

    #[test]
    fn mixed_distribution_splits_volume_by_weight() {
        let usage = UsageDistribution::from([("gpt-4", 0.5), ("unknown-model", 0.5)]);
        let result = estimate_migration(&usage, DEFAULT_MONTHLY_VOLUME, &gpt4_table()).unwrap();
        // Only the gpt-4 half is priced: 450 / 2.
        assert!((result.source_cost - 225.0).abs() < 1e-9);
        assert_eq!(result.unresolved_models, vec!["unknown-model"]);
    }

    #[test]
    fn zero_source_cost_yields_zero_percentage() {
        let usage = UsageDistribution::single("gpt-4");
        let pricing = table(vec![
            entry("openai/gpt-4", 0.0, 0.0),
            entry("mistralai/mistral-large", 0.0, 0.0),
        ]);
        let result = estimate_migration(&usage, DEFAULT_MONTHLY_VOLUME, &pricing).unwrap();
        assert_eq!(result.savings_percentage, 0.0);
    }

    #[test]
    fn compare_gpt4_to_mistral_large() {
        let comparison = compare("gpt-4", &gpt4_table()).unwrap();
        assert_eq!(comparison.source_model, "openai/gpt-4");
        assert_eq!(comparison.target_model, "mistralai/mistral-large");
        // (0.00003 + 0.00006) * 500k = 45 per 1M tokens.
        assert!((comparison.source_cost_per_1m - 45.0).abs() < 1e-9);
        assert!((comparison.target_cost_per_1m - 16.0).abs() < 1e-9);
        assert!(comparison.savings_percentage > 60.0);
    }

    #[test]
    fn compare_unmapped_model_is_none() {
        assert!(compare("llama-3", &gpt4_table()).is_none());
    }
}
