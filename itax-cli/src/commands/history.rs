use std::io::Write;

use anyhow::{Context, Result};
use itax_core::{Regime, SavedComputation};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use crate::app::AppContext;
use crate::cli::HistoryCommand;
use crate::format::{assessment_year_label, format_rupees};
use crate::output;

#[derive(Debug, Serialize, Tabled)]
struct HistoryRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "AY")]
    assessment_year: String,
    #[tabled(rename = "Profile")]
    profile: String,
    #[tabled(rename = "Gross income", display_with = "format_rupees")]
    gross_income: Decimal,
    #[tabled(rename = "Deductions", display_with = "format_rupees")]
    deductions: Decimal,
    #[tabled(rename = "Old regime", display_with = "format_rupees")]
    old_final_tax: Decimal,
    #[tabled(rename = "New regime", display_with = "format_rupees")]
    new_final_tax: Decimal,
    #[tabled(rename = "Recommended")]
    recommended_regime: Regime,
    #[tabled(rename = "Savings", display_with = "format_rupees")]
    savings: Decimal,
    #[tabled(rename = "Saved")]
    saved_at: String,
}

impl From<&SavedComputation> for HistoryRow {
    fn from(c: &SavedComputation) -> Self {
        Self {
            id: c.id,
            assessment_year: assessment_year_label(c.assessment_year),
            profile: c.profile_id.map(|id| id.to_string()).unwrap_or_default(),
            gross_income: c.income.gross_total(),
            deductions: c.deductions,
            old_final_tax: c.old_final_tax,
            new_final_tax: c.new_final_tax,
            recommended_regime: c.recommended_regime,
            savings: c.savings,
            saved_at: c.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

pub(super) async fn run(
    ctx: &AppContext,
    command: HistoryCommand,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        HistoryCommand::List { profile, this_year } => {
            let year = this_year.then_some(ctx.assessment_year);
            let computations = ctx
                .repo
                .list_computations(profile, year)
                .await
                .context("Failed to read computation history")?;
            let rows: Vec<HistoryRow> = computations.iter().map(HistoryRow::from).collect();
            writeln!(out, "{}", output::render(ctx.output, &computations, &rows)?)?;
        }
        HistoryCommand::Show { id } => {
            let computation = ctx
                .repo
                .get_computation(id)
                .await
                .with_context(|| format!("Failed to read computation {id}"))?;
            let rows = [HistoryRow::from(&computation)];
            writeln!(out, "{}", output::render(ctx.output, &computation, &rows)?)?;
        }
        HistoryCommand::Delete { id } => {
            ctx.repo
                .delete_computation(id)
                .await
                .with_context(|| format!("Failed to delete computation {id}"))?;
            info!(id, "deleted computation");
            writeln!(out, "Deleted computation #{id}.")?;
        }
    }
    Ok(())
}
