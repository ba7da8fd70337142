use crate::error::Warning;
use crate::pricing::PricingTable;
use crate::savings::{ModelComparison, SavingsResult, TokenVolume};
use crate::scan::{Category, ScanResult};

fn warning_json(warning: &Warning) -> serde_json::Value {
    match warning {
        Warning::UnreadableFile { path, reason } => serde_json::json!({
            "kind": "unreadable_file",
            "path": path.display().to_string(),
            "reason": reason,
        }),
        Warning::PricingFallback { reason } => serde_json::json!({
            "kind": "pricing_fallback",
            "reason": reason,
        }),
        Warning::UnresolvedModel { model } => serde_json::json!({
            "kind": "unresolved_model",
            "model": model,
        }),
    }
}

/// Full machine-readable scan report: call sites, per-category counts,
/// savings, and warnings.
pub(crate) fn scan_report_json(
    scan: &ScanResult,
    savings: &SavingsResult,
    pricing: &PricingTable,
    volume: TokenVolume,
    warnings: &[Warning],
) -> String {
    let counts = scan.category_counts();
    let categories: serde_json::Map<String, serde_json::Value> = [
        Category::Chat,
        Category::Streaming,
        Category::Embedding,
        Category::FunctionCalling,
        Category::Unknown,
    ]
    .iter()
    .map(|c| {
        (
            c.label().to_string(),
            serde_json::json!(counts.get(c).copied().unwrap_or(0)),
        )
    })
    .collect();

    let value = serde_json::json!({
        "call_sites": scan.call_sites,
        "category_counts": categories,
        "files_scanned": scan.files_scanned,
        "pricing_source": pricing.source,
        "pricing_fetched_at": pricing.fetched_at.to_rfc3339(),
        "volume": volume,
        "savings": savings,
        "warnings": warnings.iter().map(warning_json).collect::<Vec<_>>(),
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}

pub(crate) fn savings_json(savings: &SavingsResult, volume: TokenVolume) -> String {
    let value = serde_json::json!({
        "volume": volume,
        "savings": savings,
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
}

pub(crate) fn comparison_json(comparisons: &[ModelComparison]) -> String {
    serde_json::to_string_pretty(comparisons).unwrap_or_else(|_| "[]".to_string())
}
