//! Plain-text migration guide
//!
//! Template substitution over the scan and savings results. The interesting
//! engineering lives upstream; this module only arranges it for humans.

use std::fmt::Write;

use crate::error::Warning;
use crate::pricing::{PricingTable, TableSource};
use crate::savings::{SavingsResult, TokenVolume};
use crate::scan::{Category, ScanResult};

use super::templates::template_for;

const RULE: &str =
    "================================================================================";
const THIN_RULE: &str = "----------------------------------------";

/// Categories in guide order; `Unknown` last so the actionable material
/// leads.
const CATEGORY_ORDER: &[Category] = &[
    Category::Chat,
    Category::Streaming,
    Category::FunctionCalling,
    Category::Embedding,
    Category::Unknown,
];

pub(crate) fn build_guide(
    scan: &ScanResult,
    savings: &SavingsResult,
    pricing: &PricingTable,
    volume: TokenVolume,
    warnings: &[Warning],
) -> String {
    if scan.call_sites.is_empty() {
        return "No OpenAI API calls detected. Nothing to migrate!\n".to_string();
    }

    let mut out = String::new();
    let counts = scan.category_counts();

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "MIGRATION GUIDE: OpenAI -> Mistral AI");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out);

    // Summary
    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(
        out,
        "Found {} OpenAI API call(s) across {} file(s)",
        scan.call_sites.len(),
        scan.touched_files().len()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Pattern breakdown:");
    for category in CATEGORY_ORDER {
        if let Some(count) = counts.get(category) {
            let _ = writeln!(out, "  * {category}: {count} call(s)");
        }
    }
    let _ = writeln!(out);

    // Savings
    let pricing_note = match pricing.source {
        TableSource::Live => format!("live OpenRouter rates, fetched {}", pricing.fetched_at.format("%Y-%m-%d %H:%M UTC")),
        TableSource::Fallback => "fallback rates, live pricing unavailable".to_string(),
    };
    let _ = writeln!(out, "ESTIMATED SAVINGS ({pricing_note})");
    let _ = writeln!(
        out,
        "Assuming {}M prompt + {}M completion tokens per month:",
        volume.prompt_tokens / 1_000_000,
        volume.completion_tokens / 1_000_000
    );
    let _ = writeln!(out, "  OpenAI:  ${:.2}/month", savings.source_cost);
    let _ = writeln!(out, "  Mistral: ${:.2}/month", savings.target_cost);
    let _ = writeln!(
        out,
        "  Savings: ${:.2}/month ({:.1}% reduction)",
        savings.savings_amount, savings.savings_percentage
    );
    if !savings.unresolved_models.is_empty() {
        let _ = writeln!(
            out,
            "  Not priced (no pricing or no equivalent): {}",
            savings.unresolved_models.join(", ")
        );
    }
    let _ = writeln!(out);

    // Per-category examples, once per detected category
    let _ = writeln!(out, "MIGRATION EXAMPLES");
    let _ = writeln!(out);
    for category in CATEGORY_ORDER {
        if !counts.contains_key(category) {
            continue;
        }
        let Some(template) = template_for(*category) else {
            continue;
        };
        let _ = writeln!(out, "## {} MIGRATION", category.label().to_uppercase());
        let _ = writeln!(out, "Effort: {}", template.effort);
        let _ = writeln!(out);
        let _ = writeln!(out, "BEFORE (OpenAI):");
        let _ = writeln!(out, "{THIN_RULE}");
        let _ = writeln!(out, "{}", template.openai);
        let _ = writeln!(out);
        let _ = writeln!(out, "AFTER (Mistral):");
        let _ = writeln!(out, "{THIN_RULE}");
        let _ = writeln!(out, "{}", template.mistral);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", template.notes);
        let _ = writeln!(out);
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out);
    }

    // Files to update
    let _ = writeln!(out, "FILES TO UPDATE");
    let _ = writeln!(out);
    for file in scan.touched_files() {
        let _ = writeln!(out, "  {file}");
        for call in scan.call_sites.iter().filter(|c| c.file_path == file) {
            let model = call.model_id.as_deref().unwrap_or("model not detected");
            let _ = writeln!(
                out,
                "    Line {}: {} ({}, confidence {:.2})",
                call.line_number, call.category, model, call.confidence
            );
        }
    }
    let _ = writeln!(out);

    if !warnings.is_empty() {
        let _ = writeln!(out, "WARNINGS");
        for warning in warnings {
            let _ = writeln!(out, "  ! {warning}");
        }
        let _ = writeln!(out);
    }

    // Next steps
    let _ = writeln!(out, "NEXT STEPS");
    let _ = writeln!(out);
    let _ = writeln!(out, "1. Install the Mistral SDK: pip install mistralai");
    let _ = writeln!(out, "2. Get an API key: https://console.mistral.ai/");
    let _ = writeln!(out, "3. Update imports in the files listed above");
    let _ = writeln!(out, "4. Replace model names (gpt-4 -> mistral-large-latest)");
    let _ = writeln!(out, "5. Test thoroughly in development");
    let _ = writeln!(out, "6. Monitor cost savings in production");
    let _ = writeln!(out);
    let _ = writeln!(out, "{RULE}");

    out
}
