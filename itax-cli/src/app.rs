use anyhow::{Context, Result, bail};
use itax_core::{
    DEFAULT_ASSESSMENT_YEAR, Regime, RegimeParameters, RepositoryError, RepositoryRegistry,
    TaxLiabilityEngine, TaxRepository,
};
use itax_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, warn};

use crate::output::OutputFormat;

/// Registry with every backend compiled into the binary.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// What every command runs against.
pub struct AppContext {
    pub repo: Box<dyn TaxRepository>,
    pub assessment_year: i32,
    pub output: OutputFormat,
}

impl AppContext {
    pub async fn engine(&self) -> Result<TaxLiabilityEngine> {
        engine_for(self.repo.as_ref(), self.assessment_year).await
    }
}

/// Builds the engine for `assessment_year` from stored parameters.
///
/// A year whose slabs were loaded from CSV but that has no stored regime
/// configuration borrows the built-in configuration around those slabs.
/// The default year falls back to the built-in parameters entirely.
pub async fn engine_for(
    repo: &dyn TaxRepository,
    assessment_year: i32,
) -> Result<TaxLiabilityEngine> {
    let old = regime_parameters(repo, assessment_year, Regime::Old).await?;
    let new = regime_parameters(repo, assessment_year, Regime::New).await?;
    TaxLiabilityEngine::new(old, new)
        .with_context(|| format!("Stored parameters for AY {assessment_year} are unusable"))
}

async fn regime_parameters(
    repo: &dyn TaxRepository,
    assessment_year: i32,
    regime: Regime,
) -> Result<RegimeParameters> {
    match repo.get_regime_parameters(assessment_year, regime).await {
        Ok(params) => {
            debug!(assessment_year, %regime, "using stored regime parameters");
            Ok(params)
        }
        Err(RepositoryError::NotFound) => {
            let slabs = repo
                .get_tax_slabs(assessment_year, regime)
                .await
                .with_context(|| format!("Failed to read {regime} regime slabs"))?;
            if !slabs.is_empty() {
                warn!(
                    assessment_year,
                    %regime,
                    "no stored regime configuration; using built-in amounts with loaded slabs"
                );
                return Ok(RegimeParameters {
                    assessment_year,
                    slabs,
                    ..RegimeParameters::statutory(regime)
                });
            }
            if assessment_year == DEFAULT_ASSESSMENT_YEAR {
                warn!(%regime, "no stored parameters; using built-in parameters");
                return Ok(RegimeParameters::statutory(regime));
            }
            bail!("No {regime} regime parameters for AY {assessment_year}; load slabs for that year first")
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read {regime} regime parameters")),
    }
}

#[cfg(test)]
mod tests {
    use itax_core::{DbConfig, IncomeBreakdown, TaxSlab};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    async fn repo() -> Box<dyn TaxRepository> {
        build_registry()
            .create(&DbConfig::new("sqlite", ":memory:"))
            .await
            .expect("Failed to open in-memory repository")
    }

    #[test]
    fn registry_offers_sqlite() {
        assert_eq!(build_registry().available_backends(), vec!["sqlite"]);
    }

    #[tokio::test]
    async fn seeded_year_matches_built_in_engine() {
        let repo = repo().await;

        let engine = engine_for(repo.as_ref(), 2025).await.unwrap();

        assert_eq!(engine, TaxLiabilityEngine::default());
    }

    #[tokio::test]
    async fn unknown_year_without_slabs_is_an_error() {
        let repo = repo().await;

        let err = engine_for(repo.as_ref(), 2031).await.unwrap_err();

        assert!(err.to_string().contains("AY 2031"), "got: {err:#}");
    }

    #[tokio::test]
    async fn loaded_slabs_without_configuration_use_built_in_amounts() {
        let repo = repo().await;
        for regime in Regime::ALL {
            for slab in [
                (dec!(0), Some(dec!(400000)), dec!(0)),
                (dec!(400000), None, dec!(0.10)),
            ] {
                repo.insert_tax_slab(&TaxSlab {
                    assessment_year: 2026,
                    regime,
                    min_income: slab.0,
                    max_income: slab.1,
                    rate: slab.2,
                })
                .await
                .unwrap();
            }
        }

        let engine = engine_for(repo.as_ref(), 2026).await.unwrap();

        let new = engine.parameters(Regime::New);
        assert_eq!(new.assessment_year, 2026);
        assert_eq!(new.standard_deduction, dec!(75000));
        assert_eq!(new.slabs.len(), 2);
        // taxable 925000: 525000 at 10%
        let result = engine
            .compute_liability(&IncomeBreakdown::salary(dec!(1000000)), dec!(0))
            .unwrap();
        assert_eq!(result.new.base_tax, dec!(52500));
    }
}
