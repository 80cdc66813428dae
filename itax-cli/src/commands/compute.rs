use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use itax_core::NewSavedComputation;
use tracing::info;

use super::{Computation, IDLE_PLACEHOLDER};
use crate::app::AppContext;
use crate::cli::{ComputationArgs, ComputeArgs};
use crate::output::{self, OutputFormat};
use crate::report::ComputationReport;

pub(super) async fn compute(
    ctx: &AppContext,
    args: &ComputeArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let engine = ctx.engine().await?;
    let computation = Computation::prepare(ctx, &engine, &args.computation).await?;

    if computation.result.is_idle() {
        writeln!(out, "{IDLE_PLACEHOLDER}")?;
        return Ok(());
    }

    let report = ComputationReport::new(ctx.assessment_year, computation.income, &computation.result);
    match ctx.output {
        OutputFormat::Table => {
            writeln!(out, "{}", output::table(&report.rows()))?;
            writeln!(out, "{}", report.summary())?;
        }
        OutputFormat::Json => writeln!(out, "{}", output::json(&computation.result)?)?,
        OutputFormat::Csv => report
            .write_csv(&mut *out)
            .context("Failed to write CSV report")?,
    }

    if args.save {
        let saved = ctx
            .repo
            .save_computation(NewSavedComputation::from_result(
                computation.profile_id,
                ctx.assessment_year,
                computation.income,
                computation.deductions.total_allowed,
                &computation.result,
            ))
            .await
            .context("Failed to save computation")?;
        info!(id = saved.id, "saved computation");
        if ctx.output == OutputFormat::Table {
            writeln!(out, "Saved as computation #{}.", saved.id)?;
        }
    }

    Ok(())
}

pub(super) async fn export(
    ctx: &AppContext,
    args: &ComputationArgs,
    path: &Path,
    out: &mut dyn Write,
) -> Result<()> {
    let engine = ctx.engine().await?;
    let computation = Computation::prepare(ctx, &engine, args).await?;
    let report = ComputationReport::new(ctx.assessment_year, computation.income, &computation.result);

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    report
        .write_csv(file)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), "exported computation report");
    writeln!(out, "Wrote report to {}.", path.display())?;
    Ok(())
}
