//! One module per subcommand. Every handler writes its result to `out`
//! and logs through `tracing`.

mod advance_tax;
mod batch;
mod compute;
mod deadlines;
mod deductions;
mod history;
mod params;
mod profiles;
mod recommend;

use std::io::Write;

use anyhow::{Context, Result, bail};
use itax_core::calculations::common::parse_amount;
use itax_core::{
    DeductionSection, DeductionSummary, IncomeBreakdown, Regime, TaxComputationResult, TaxLiabilityEngine,
    summarize_deductions, summarize_items,
};
use rust_decimal::Decimal;

use crate::app::AppContext;
use crate::cli::{Command, ComputationArgs, DeductionArgs, IncomeArgs};

/// Shown instead of a result when there is no income at all.
pub const IDLE_PLACEHOLDER: &str = "Enter your income to compare the old and new regimes.";

pub async fn run(
    ctx: &AppContext,
    command: Command,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Command::Compute(args) => compute::compute(ctx, &args, out).await,
        Command::Export { computation, out: path } => compute::export(ctx, &computation, &path, out).await,
        Command::Recommend(args) => recommend::run(ctx, &args, out).await,
        Command::AdvanceTax {
            computation,
            tds,
            regime,
        } => advance_tax::run(ctx, &computation, &tds, regime.map(Regime::from), out).await,
        Command::Batch { file } => batch::run(ctx, &file, out).await,
        Command::Params => params::run(ctx, out).await,
        Command::Profile(command) => profiles::run(ctx, command, out).await,
        Command::Deduction(command) => deductions::run(ctx, command, out).await,
        Command::History(command) => history::run(ctx, command, out).await,
        Command::Deadlines(command) => deadlines::run(ctx, command, out).await,
    }
}

/// Engine inputs gathered from the command line and the repository, and
/// the engine's answer.
#[derive(Debug, Clone)]
struct Computation {
    income: IncomeBreakdown,
    profile_id: Option<i64>,
    deductions: DeductionSummary,
    result: TaxComputationResult,
}

impl Computation {
    async fn prepare(
        ctx: &AppContext,
        engine: &TaxLiabilityEngine,
        args: &ComputationArgs,
    ) -> Result<Self> {
        let income = income(&args.income)?;
        let deductions = deduction_summary(ctx, &args.deductions).await?;
        let result = engine.compute_liability(&income, deductions.total_allowed)?;
        Ok(Self {
            income,
            profile_id: args.deductions.profile,
            deductions,
            result,
        })
    }
}

fn income(args: &IncomeArgs) -> Result<IncomeBreakdown> {
    Ok(IncomeBreakdown {
        salary: parse_amount("salary", &args.salary)?,
        house_property: parse_amount("house_property", &args.house_property)?,
        business_profession: parse_amount("business_profession", &args.business_profession)?,
        capital_gains: parse_amount("capital_gains", &args.capital_gains)?,
        other_sources: parse_amount("other_sources", &args.other_sources)?,
    })
}

/// A lump sum is treated as uncapped `OTHER` deductions.
async fn deduction_summary(
    ctx: &AppContext,
    args: &DeductionArgs,
) -> Result<DeductionSummary> {
    if let Some(profile_id) = args.profile {
        ctx.repo
            .get_profile(profile_id)
            .await
            .with_context(|| format!("Failed to read profile {profile_id}"))?;
        let items = ctx
            .repo
            .list_deductions(profile_id, ctx.assessment_year)
            .await
            .context("Failed to read deduction items")?;
        return Ok(summarize_items(&items)?);
    }

    if !args.claim.is_empty() {
        let claims = args
            .claim
            .iter()
            .map(|claim| parse_claim(claim))
            .collect::<Result<Vec<_>>>()?;
        return Ok(summarize_deductions(claims)?);
    }

    let lump = match &args.deductions {
        Some(raw) => parse_amount("deductions", raw)?,
        None => Decimal::ZERO,
    };
    let claims = if lump.is_zero() {
        Vec::new()
    } else {
        vec![(DeductionSection::Other, lump)]
    };
    Ok(summarize_deductions(claims)?)
}

/// `80C=150000` -> (80C, 150000).
fn parse_claim(claim: &str) -> Result<(DeductionSection, Decimal)> {
    let Some((section, amount)) = claim.split_once('=') else {
        bail!("Claim '{claim}' is not in SECTION=AMOUNT form");
    };
    let Some(section) = DeductionSection::parse(section) else {
        bail!("Unknown deduction section '{}'", section.trim());
    };
    let amount = parse_amount(section.as_str(), amount)?;
    Ok((section, amount))
}

fn parse_section(code: &str) -> Result<DeductionSection> {
    DeductionSection::parse(code).with_context(|| {
        let known: Vec<_> = DeductionSection::ALL.iter().map(|s| s.as_str()).collect();
        format!("Unknown deduction section '{code}' (expected one of {})", known.join(", "))
    })
}
