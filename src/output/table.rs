use comfy_table::{
    Cell, CellAlignment, ContentArrangement, Table, modifiers::UTF8_SOLID_INNER_BORDERS,
    presets::UTF8_FULL,
};

use crate::savings::{ModelComparison, SavingsResult};

fn base_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h)).collect::<Vec<_>>());
    table
}

fn money_cell(amount: f64) -> Cell {
    Cell::new(format!("${amount:.2}")).set_alignment(CellAlignment::Right)
}

/// Per-model savings breakdown plus a totals row.
pub(crate) fn savings_table(savings: &SavingsResult) -> Table {
    let mut table = base_table(&["Model", "OpenAI / mo", "Mistral / mo", "Savings / mo"]);

    for (model, source_cost) in &savings.source_breakdown {
        let target_cost = savings.target_breakdown.get(model).copied().unwrap_or(0.0);
        table.add_row(vec![
            Cell::new(model),
            money_cell(*source_cost),
            money_cell(target_cost),
            money_cell(source_cost - target_cost),
        ]);
    }

    table.add_row(vec![
        Cell::new("Total"),
        money_cell(savings.source_cost),
        money_cell(savings.target_cost),
        money_cell(savings.savings_amount),
    ]);
    table
}

/// Side-by-side per-1M-token comparison rows.
pub(crate) fn comparison_table(comparisons: &[ModelComparison]) -> Table {
    let mut table = base_table(&[
        "OpenAI model",
        "Mistral equivalent",
        "OpenAI / 1M",
        "Mistral / 1M",
        "Savings",
    ]);
    for comparison in comparisons {
        table.add_row(vec![
            Cell::new(&comparison.source_model),
            Cell::new(&comparison.target_model),
            money_cell(comparison.source_cost_per_1m),
            money_cell(comparison.target_cost_per_1m),
            Cell::new(format!("{:.1}%", comparison.savings_percentage))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
