use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::cli::{Cli, Commands, parse_weight_spec};
use crate::config::Config;
use crate::error::Warning;
use crate::output::{
    build_guide, comparison_json, comparison_table, savings_json, savings_table, scan_report_json,
};
use crate::pricing::{OpenRouterFetcher, PricingCache, TableSource, mapped_models};
use crate::savings::{
    ModelComparison, TokenVolume, UsageDistribution, compare, estimate_migration,
};
use crate::scan::{ScanOptions, ScanResult, scan};

pub(crate) fn run(cli: &Cli, config: &Config) -> Result<(), String> {
    let cache = build_cache(cli, config);

    match &cli.command {
        Commands::Scan {
            directory,
            output,
            extensions,
        } => handle_scan(cli, config, &cache, directory, output.as_deref(), extensions),
        Commands::Savings {
            prompt_tokens,
            completion_tokens,
            model,
        } => handle_savings(
            cli,
            config,
            &cache,
            *prompt_tokens,
            *completion_tokens,
            model,
        ),
        Commands::Compare { model } => handle_compare(cli, &cache, model.as_deref()),
    }
}

fn build_cache(cli: &Cli, config: &Config) -> PricingCache {
    if cli.offline {
        return PricingCache::offline(cli.quiet);
    }
    let fetcher = OpenRouterFetcher::new(config.fetch_timeout(), config.resolved_api_key());
    PricingCache::new(Box::new(fetcher), config.ttl(), cli.quiet)
}

fn handle_scan(
    cli: &Cli,
    config: &Config,
    cache: &PricingCache,
    directory: &Path,
    output: Option<&Path>,
    extensions: &[String],
) -> Result<(), String> {
    let options = ScanOptions {
        extensions: if extensions.is_empty() {
            config.extensions.clone().unwrap_or_default()
        } else {
            extensions.to_vec()
        },
        quiet: cli.quiet,
        cancel: None,
    };

    let result = scan(directory, &options).map_err(|e| e.to_string())?;
    let pricing = cache.current();

    let mut warnings = result.warnings.clone();
    if pricing.source == TableSource::Fallback && !cli.offline {
        warnings.push(Warning::PricingFallback {
            reason: cache
                .last_error()
                .unwrap_or_else(|| "no live data".to_string()),
        });
    }

    let usage = usage_from_scan(&result);
    let volume = config.default_volume();
    let savings = estimate_migration(&usage, volume, &pricing).map_err(|e| e.to_string())?;
    for model in &savings.unresolved_models {
        warnings.push(Warning::UnresolvedModel {
            model: model.clone(),
        });
    }

    let rendered = if cli.json {
        scan_report_json(&result, &savings, &pricing, volume, &warnings)
    } else {
        build_guide(&result, &savings, &pricing, volume, &warnings)
    };

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
            if !cli.quiet {
                eprintln!("Migration guide saved to: {}", path.display());
            }
        }
        None => println!("{rendered}"),
    }

    if !cli.json && !result.call_sites.is_empty() {
        println!("{}", savings_table(&savings));
    }
    Ok(())
}

/// Derive a usage distribution from the models the scan actually saw,
/// weighted by call-site count. Falls back to 100% gpt-4 when nothing
/// carried a model id (the original tool's default assumption).
fn usage_from_scan(result: &ScanResult) -> UsageDistribution {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for call in &result.call_sites {
        if let Some(model) = call.model_id.as_deref() {
            *counts.entry(model).or_insert(0) += 1;
        }
    }

    let total: usize = counts.values().sum();
    if total == 0 {
        return UsageDistribution::single("gpt-4");
    }

    let mut usage = UsageDistribution::new();
    for (model, count) in counts {
        usage.set(model, count as f64 / total as f64);
    }
    usage
}

fn handle_savings(
    cli: &Cli,
    config: &Config,
    cache: &PricingCache,
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    model_specs: &[String],
) -> Result<(), String> {
    let mut usage = UsageDistribution::new();
    for spec in model_specs {
        let (model, weight) = parse_weight_spec(spec)?;
        usage.set(&model, weight);
    }
    if usage.is_empty() {
        usage = UsageDistribution::single("gpt-4");
    }

    let defaults = config.default_volume();
    let volume = TokenVolume {
        prompt_tokens: prompt_tokens.unwrap_or(defaults.prompt_tokens),
        completion_tokens: completion_tokens.unwrap_or(defaults.completion_tokens),
    };

    let pricing = cache.current();
    let savings = estimate_migration(&usage, volume, &pricing).map_err(|e| e.to_string())?;

    if cli.json {
        println!("{}", savings_json(&savings, volume));
        return Ok(());
    }

    println!("{}", savings_table(&savings));
    println!(
        "Estimated savings: ${:.2}/month ({:.1}% reduction)",
        savings.savings_amount, savings.savings_percentage
    );
    for model in &savings.unresolved_models {
        eprintln!(
            "{}",
            Warning::UnresolvedModel {
                model: model.clone()
            }
        );
    }
    Ok(())
}

fn handle_compare(cli: &Cli, cache: &PricingCache, model: Option<&str>) -> Result<(), String> {
    let pricing = cache.current();

    let comparisons: Vec<ModelComparison> = match model {
        Some(model) => {
            let comparison = compare(model, &pricing).ok_or_else(|| {
                format!("No Mistral equivalent or pricing known for \"{model}\"")
            })?;
            vec![comparison]
        }
        None => mapped_models()
            .filter_map(|model| compare(model, &pricing))
            .collect(),
    };

    if cli.json {
        println!("{}", comparison_json(&comparisons));
    } else {
        println!("{}", comparison_table(&comparisons));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{CallSite, Category};

    fn site(model: Option<&str>) -> CallSite {
        CallSite {
            file_path: "a.py".to_string(),
            line_number: 1,
            category: Category::Chat,
            raw_snippet: String::new(),
            model_id: model.map(str::to_string),
            confidence: 0.9,
        }
    }

    #[test]
    fn usage_defaults_to_gpt4_when_no_models_detected() {
        let result = ScanResult {
            call_sites: vec![site(None)],
            warnings: Vec::new(),
            files_scanned: 1,
        };
        let usage = usage_from_scan(&result);
        assert!(!usage.is_empty());
        // A bare default distribution must still pass validation.
        let pricing = crate::pricing::PricingCache::offline(true).current();
        assert!(
            estimate_migration(&usage, crate::savings::DEFAULT_MONTHLY_VOLUME, &pricing).is_ok()
        );
    }

    #[test]
    fn usage_weights_follow_call_counts() {
        let result = ScanResult {
            call_sites: vec![
                site(Some("gpt-4")),
                site(Some("gpt-4")),
                site(Some("gpt-3.5-turbo")),
                site(None),
            ],
            warnings: Vec::new(),
            files_scanned: 1,
        };
        let usage = usage_from_scan(&result);
        let pricing = crate::pricing::PricingCache::offline(true).current();
        let savings =
            estimate_migration(&usage, crate::savings::DEFAULT_MONTHLY_VOLUME, &pricing).unwrap();
        // gpt-4 carries 2/3 of the volume, so it dominates the breakdown.
        let gpt4 = savings.source_breakdown.get("gpt-4").copied().unwrap();
        let gpt35 = savings.source_breakdown.get("gpt-3.5-turbo").copied().unwrap();
        assert!(gpt4 > gpt35);
    }
}
