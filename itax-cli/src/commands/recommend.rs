use std::io::Write;

use anyhow::Result;
use itax_core::{SavingsSuggestion, suggest_savings};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::Tabled;

use super::{Computation, IDLE_PLACEHOLDER};
use crate::app::AppContext;
use crate::cli::ComputationArgs;
use crate::format::format_rupees;
use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct SuggestionRow {
    #[tabled(rename = "Section")]
    section: &'static str,
    #[tabled(rename = "Claimed", display_with = "format_rupees")]
    current: Decimal,
    #[tabled(rename = "Limit", display_with = "format_rupees")]
    limit: Decimal,
    #[tabled(rename = "Headroom", display_with = "format_rupees")]
    headroom: Decimal,
    #[tabled(rename = "Old-regime tax if claimed", display_with = "format_rupees")]
    projected_old_tax: Decimal,
    #[tabled(rename = "Saving", display_with = "format_rupees")]
    estimated_saving: Decimal,
}

impl From<&SavingsSuggestion> for SuggestionRow {
    fn from(s: &SavingsSuggestion) -> Self {
        Self {
            section: s.section.as_str(),
            current: s.current,
            limit: s.limit,
            headroom: s.headroom,
            projected_old_tax: s.projected_old_tax,
            estimated_saving: s.estimated_saving,
        }
    }
}

pub(super) async fn run(
    ctx: &AppContext,
    args: &ComputationArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let engine = ctx.engine().await?;
    let computation = Computation::prepare(ctx, &engine, args).await?;
    if computation.result.is_idle() {
        writeln!(out, "{IDLE_PLACEHOLDER}")?;
        return Ok(());
    }

    let report = suggest_savings(&engine, &computation.income, &computation.deductions)?;
    let rows: Vec<SuggestionRow> = report.suggestions.iter().map(SuggestionRow::from).collect();

    writeln!(out, "{}", output::render(ctx.output, &report, &rows)?)?;
    if ctx.output == OutputFormat::Table {
        let old_tax = report.baseline.old.final_tax;
        let new_tax = report.baseline.new.final_tax;
        writeln!(
            out,
            "Old regime tax now {}; new regime tax {}. The {} is cheaper by {}.",
            format_rupees(&old_tax),
            format_rupees(&new_tax),
            report.recommendation().regime.label().to_lowercase(),
            format_rupees(&report.recommendation().savings),
        )?;
        if report.suggestions.is_empty() {
            writeln!(out, "Every capped section is fully claimed.")?;
        }
    }
    Ok(())
}
