use std::io::Write;

use anyhow::Result;
use itax_core::{Regime, RegimeParameters};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::Tabled;

use crate::app::AppContext;
use crate::format::{assessment_year_label, format_optional_rupees, format_rate, format_rupees};
use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct ConfigRow {
    #[tabled(rename = "Regime")]
    regime: Regime,
    #[tabled(rename = "Standard deduction", display_with = "format_rupees")]
    standard_deduction: Decimal,
    #[tabled(rename = "Rebate up to", display_with = "format_rupees")]
    rebate_ceiling: Decimal,
    #[tabled(rename = "Rebate cap", display_with = "format_rupees")]
    rebate_cap: Decimal,
    #[tabled(rename = "Cess", display_with = "format_rate")]
    cess_rate: Decimal,
    #[tabled(rename = "Itemized deductions")]
    allows_itemized_deductions: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct SlabRow {
    #[tabled(rename = "Regime")]
    regime: Regime,
    #[tabled(rename = "From", display_with = "format_rupees")]
    min_income: Decimal,
    #[tabled(rename = "To", display_with = "format_optional_rupees")]
    max_income: Option<Decimal>,
    #[tabled(rename = "Rate", display_with = "format_rate")]
    rate: Decimal,
}

#[derive(Debug, Serialize, Tabled)]
struct SurchargeRow {
    #[tabled(rename = "Regime")]
    regime: Regime,
    #[tabled(rename = "Taxable income above", display_with = "format_rupees")]
    threshold: Decimal,
    #[tabled(rename = "Surcharge", display_with = "format_rate")]
    rate: Decimal,
}

pub(super) async fn run(
    ctx: &AppContext,
    out: &mut dyn Write,
) -> Result<()> {
    let engine = ctx.engine().await?;
    let params: Vec<&RegimeParameters> = Regime::ALL.iter().map(|r| engine.parameters(*r)).collect();

    let slabs: Vec<SlabRow> = params
        .iter()
        .flat_map(|p| {
            p.slabs.iter().map(|slab| SlabRow {
                regime: p.regime,
                min_income: slab.min_income,
                max_income: slab.max_income,
                rate: slab.rate,
            })
        })
        .collect();

    if ctx.output != OutputFormat::Table {
        writeln!(out, "{}", output::render(ctx.output, &params, &slabs)?)?;
        return Ok(());
    }

    let config: Vec<ConfigRow> = params
        .iter()
        .map(|p| ConfigRow {
            regime: p.regime,
            standard_deduction: p.standard_deduction,
            rebate_ceiling: p.rebate_ceiling,
            rebate_cap: p.rebate_cap,
            cess_rate: p.cess_rate,
            allows_itemized_deductions: p.allows_itemized_deductions,
        })
        .collect();
    let surcharge: Vec<SurchargeRow> = params
        .iter()
        .flat_map(|p| {
            p.surcharge_bands.iter().map(|band| SurchargeRow {
                regime: p.regime,
                threshold: band.threshold,
                rate: band.rate,
            })
        })
        .collect();

    writeln!(out, "AY {}", assessment_year_label(ctx.assessment_year))?;
    writeln!(out, "{}", output::table(&config))?;
    writeln!(out, "{}", output::table(&slabs))?;
    writeln!(out, "{}", output::table(&surcharge))?;
    Ok(())
}
