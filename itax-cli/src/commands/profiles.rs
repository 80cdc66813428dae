use std::io::Write;

use anyhow::{Context, Result};
use itax_core::{DeductionSummary, NewUserProfile, Regime, UserProfile, summarize_items};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::Tabled;
use tracing::info;

use crate::app::AppContext;
use crate::cli::ProfileCommand;
use crate::format::{format_optional_rupees, format_rupees};
use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct ProfileRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "PAN")]
    pan: String,
    #[tabled(rename = "Preferred regime")]
    preferred_regime: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&UserProfile> for ProfileRow {
    fn from(p: &UserProfile) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            pan: p.pan.clone().unwrap_or_default(),
            preferred_regime: p
                .preferred_regime
                .map(|r| r.to_string())
                .unwrap_or_default(),
            created: p.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct SectionRow {
    #[tabled(rename = "Section")]
    section: &'static str,
    #[tabled(rename = "Claimed", display_with = "format_rupees")]
    claimed: Decimal,
    #[tabled(rename = "Limit", display_with = "format_optional_rupees")]
    limit: Option<Decimal>,
    #[tabled(rename = "Allowed", display_with = "format_rupees")]
    allowed: Decimal,
}

#[derive(Debug, Serialize)]
struct ProfileDetail<'a> {
    profile: &'a UserProfile,
    assessment_year: i32,
    deductions: &'a DeductionSummary,
}

pub(super) async fn run(
    ctx: &AppContext,
    command: ProfileCommand,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        ProfileCommand::Create { name, pan, regime } => {
            let new_profile = NewUserProfile {
                name,
                pan,
                preferred_regime: regime.map(Regime::from),
            }
            .normalized()?;
            let profile = ctx
                .repo
                .create_profile(new_profile)
                .await
                .context("Failed to create profile")?;
            info!(id = profile.id, "created profile");
            let rows = [ProfileRow::from(&profile)];
            writeln!(out, "{}", output::render(ctx.output, &profile, &rows)?)?;
        }
        ProfileCommand::List => {
            let profiles = ctx.repo.list_profiles().await.context("Failed to list profiles")?;
            let rows: Vec<ProfileRow> = profiles.iter().map(ProfileRow::from).collect();
            writeln!(out, "{}", output::render(ctx.output, &profiles, &rows)?)?;
        }
        ProfileCommand::Show { id } => {
            let profile = ctx
                .repo
                .get_profile(id)
                .await
                .with_context(|| format!("Failed to read profile {id}"))?;
            let items = ctx
                .repo
                .list_deductions(id, ctx.assessment_year)
                .await
                .context("Failed to read deduction items")?;
            let summary = summarize_items(&items)?;

            let rows: Vec<SectionRow> = summary
                .sections
                .iter()
                .map(|s| SectionRow {
                    section: s.section.as_str(),
                    claimed: s.claimed,
                    limit: s.limit,
                    allowed: s.allowed,
                })
                .collect();
            let detail = ProfileDetail {
                profile: &profile,
                assessment_year: ctx.assessment_year,
                deductions: &summary,
            };
            if ctx.output == OutputFormat::Table {
                writeln!(out, "{}", output::table(&[ProfileRow::from(&profile)]))?;
                writeln!(out, "{}", output::table(&rows))?;
                writeln!(
                    out,
                    "Deductions allowed: {} of {} claimed.",
                    format_rupees(&summary.total_allowed),
                    format_rupees(&summary.total_claimed)
                )?;
            } else {
                writeln!(out, "{}", output::render(ctx.output, &detail, &rows)?)?;
            }
        }
    }
    Ok(())
}
