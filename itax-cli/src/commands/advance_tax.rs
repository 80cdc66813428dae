use std::io::Write;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use itax_core::calculations::advance_tax::ADVANCE_TAX_THRESHOLD;
use itax_core::calculations::common::parse_amount;
use itax_core::{AdvanceTaxInstalment, AdvanceTaxSchedule, Regime};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;

use super::{Computation, IDLE_PLACEHOLDER};
use crate::app::AppContext;
use crate::cli::ComputationArgs;
use crate::format::{format_percent, format_rupees};
use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct InstalmentRow {
    #[tabled(rename = "Due")]
    due_date: NaiveDate,
    #[tabled(rename = "Cumulative", display_with = "format_percent")]
    cumulative_percent: Decimal,
    #[tabled(rename = "Paid by then", display_with = "format_rupees")]
    cumulative_amount: Decimal,
    #[tabled(rename = "Instalment", display_with = "format_rupees")]
    amount: Decimal,
}

impl From<&AdvanceTaxInstalment> for InstalmentRow {
    fn from(i: &AdvanceTaxInstalment) -> Self {
        Self {
            due_date: i.due_date,
            cumulative_percent: i.cumulative_percent,
            cumulative_amount: i.cumulative_amount,
            amount: i.amount,
        }
    }
}

pub(super) async fn run(
    ctx: &AppContext,
    args: &ComputationArgs,
    tds: &str,
    regime: Option<Regime>,
    out: &mut dyn Write,
) -> Result<()> {
    let tds = parse_amount("tds", tds)?;

    let engine = ctx.engine().await?;
    let computation = Computation::prepare(ctx, &engine, args).await?;
    if computation.result.is_idle() {
        writeln!(out, "{IDLE_PLACEHOLDER}")?;
        return Ok(());
    }

    let regime = regime.unwrap_or(computation.result.recommendation.regime);
    let final_tax = computation.result.for_regime(regime).final_tax;
    // AY 2025-26 taxes income of FY 2024-25.
    let schedule = AdvanceTaxSchedule::from_liability(final_tax, tds, ctx.assessment_year - 1)?;
    debug!(%regime, %final_tax, net = %schedule.net_liability, "built advance-tax schedule");

    let rows: Vec<InstalmentRow> = schedule.instalments.iter().map(InstalmentRow::from).collect();
    if ctx.output != OutputFormat::Table {
        writeln!(out, "{}", output::render(ctx.output, &schedule, &rows)?)?;
        return Ok(());
    }

    writeln!(
        out,
        "{} final tax {} less TDS {}: net liability {}.",
        regime.label(),
        format_rupees(&schedule.final_tax),
        format_rupees(&schedule.tds),
        format_rupees(&schedule.net_liability),
    )?;
    if !schedule.required {
        writeln!(
            out,
            "No advance tax is due below {}.",
            format_rupees(&ADVANCE_TAX_THRESHOLD)
        )?;
        return Ok(());
    }
    writeln!(out, "{}", output::table(&rows))?;
    if let Some(next) = schedule.next_due(Local::now().date_naive()) {
        writeln!(
            out,
            "Next instalment: {} by {}.",
            format_rupees(&next.amount),
            next.due_date.format("%d %b %Y")
        )?;
    }
    Ok(())
}
