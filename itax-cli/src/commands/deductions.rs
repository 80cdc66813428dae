use std::io::Write;

use anyhow::{Context, Result};
use itax_core::calculations::common::parse_amount;
use itax_core::{DeductionItem, NewDeductionItem, summarize_items};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use super::parse_section;
use crate::app::AppContext;
use crate::cli::DeductionCommand;
use crate::format::format_rupees;
use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Section")]
    section: &'static str,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Amount", display_with = "format_rupees")]
    amount: Decimal,
}

impl From<&DeductionItem> for ItemRow {
    fn from(item: &DeductionItem) -> Self {
        Self {
            id: item.id,
            section: item.section.as_str(),
            description: item.description.clone(),
            amount: item.amount,
        }
    }
}

pub(super) async fn run(
    ctx: &AppContext,
    command: DeductionCommand,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        DeductionCommand::Add {
            profile,
            section,
            amount,
            description,
        } => {
            let item = NewDeductionItem {
                profile_id: profile,
                assessment_year: ctx.assessment_year,
                section: parse_section(&section)?,
                description: description.trim().to_string(),
                amount: parse_amount("amount", &amount)?,
            };
            let item = ctx
                .repo
                .add_deduction(item)
                .await
                .with_context(|| format!("Failed to add deduction for profile {profile}"))?;
            info!(id = item.id, section = %item.section, "added deduction");
            let rows = [ItemRow::from(&item)];
            writeln!(out, "{}", output::render(ctx.output, &item, &rows)?)?;
        }
        DeductionCommand::List { profile } => {
            let items = ctx
                .repo
                .list_deductions(profile, ctx.assessment_year)
                .await
                .context("Failed to read deduction items")?;
            let rows: Vec<ItemRow> = items.iter().map(ItemRow::from).collect();
            writeln!(out, "{}", output::render(ctx.output, &items, &rows)?)?;
            if ctx.output == OutputFormat::Table {
                let summary = summarize_items(&items)?;
                writeln!(
                    out,
                    "Allowed after section limits: {}.",
                    format_rupees(&summary.total_allowed)
                )?;
            }
        }
        DeductionCommand::Remove { id } => {
            ctx.repo
                .delete_deduction(id)
                .await
                .with_context(|| format!("Failed to remove deduction {id}"))?;
            info!(id, "removed deduction");
            writeln!(out, "Removed deduction #{id}.")?;
        }
    }
    Ok(())
}
