use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use itax_core::{Regime, TaxComputationResult};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use crate::app::AppContext;
use crate::batch::load_from_file;
use crate::format::format_rupees;
use crate::output;

#[derive(Debug, Serialize)]
struct BatchResult {
    label: String,
    result: TaxComputationResult,
}

#[derive(Debug, Serialize, Tabled)]
struct BatchRow {
    #[tabled(rename = "Row")]
    row: usize,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Gross income", display_with = "format_rupees")]
    gross_income: Decimal,
    #[tabled(rename = "Old regime", display_with = "format_rupees")]
    old_tax: Decimal,
    #[tabled(rename = "New regime", display_with = "format_rupees")]
    new_tax: Decimal,
    #[tabled(rename = "Recommended")]
    recommended: Regime,
    #[tabled(rename = "Savings", display_with = "format_rupees")]
    savings: Decimal,
}

pub(super) async fn run(
    ctx: &AppContext,
    file: &Path,
    out: &mut dyn Write,
) -> Result<()> {
    let entries = load_from_file(file)?;
    let engine = ctx.engine().await?;

    let mut results = Vec::with_capacity(entries.len());
    let mut rows = Vec::with_capacity(entries.len());
    for entry in entries {
        let result = engine
            .compute_liability(&entry.income, entry.deductions)
            .with_context(|| format!("Row {} ({})", entry.row, entry.label))?;
        rows.push(BatchRow {
            row: entry.row,
            label: entry.label.clone(),
            gross_income: result.gross_income,
            old_tax: result.old.final_tax,
            new_tax: result.new.final_tax,
            recommended: result.recommendation.regime,
            savings: result.recommendation.savings,
        });
        results.push(BatchResult {
            label: entry.label,
            result,
        });
    }

    info!(rows = rows.len(), file = %file.display(), "computed batch");
    writeln!(out, "{}", output::render(ctx.output, &results, &rows)?)?;
    Ok(())
}
