use std::collections::BTreeMap;
use std::io::Read;

use itax_core::{Regime, RegimeParameters, RegimeParametersError, RepositoryError, TaxRepository, TaxSlab};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading slab schedules.
#[derive(Debug, Error, PartialEq)]
pub enum TaxSlabLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown regime '{0}' (expected 'old' or 'new')")]
    InvalidRegime(String),

    #[error("Invalid {regime} regime schedule for AY {assessment_year}: {source}")]
    InvalidSchedule {
        assessment_year: i32,
        regime: Regime,
        #[source]
        source: RegimeParametersError,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for TaxSlabLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxSlabLoaderError::CsvParse(err.to_string())
    }
}

/// One row of a slab CSV.
///
/// - `assessment_year`: first year of the AY (2025 for AY 2025-26)
/// - `regime`: `old` or `new`
/// - `min_income`, `max_income`: band bounds; empty `max_income` for the top band
/// - `rate`: marginal rate as a fraction (0.05 for 5%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TaxSlabRecord {
    pub assessment_year: i32,
    pub regime: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<Decimal>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Loads slab schedules through any [`TaxRepository`] backend.
pub struct TaxSlabLoader;

impl TaxSlabLoader {
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxSlabRecord>, TaxSlabLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        csv_reader
            .deserialize()
            .map(|result| result.map_err(TaxSlabLoaderError::from))
            .collect()
    }

    /// Replaces the stored schedule of every (assessment year, regime) found
    /// in `records` and returns the number of slabs written.
    ///
    /// Every group is checked to be a complete marginal schedule (starting
    /// at zero, contiguous, open-ended top band) before anything is
    /// written, so a bad file leaves the database untouched. Each group is
    /// swapped in one [`TaxRepository::replace_tax_slabs`] call, so a
    /// database failure never leaves a half-written schedule. Loading the
    /// same file twice gives the same result.
    pub async fn load<R>(
        repo: &R,
        records: &[TaxSlabRecord],
    ) -> Result<usize, TaxSlabLoaderError>
    where
        R: TaxRepository + ?Sized,
    {
        let groups = Self::group(records)?;

        for ((assessment_year, regime), slabs) in &groups {
            Self::validate(*assessment_year, *regime, slabs)?;
        }

        let mut inserted = 0;
        for ((assessment_year, regime), slabs) in groups {
            inserted += repo.replace_tax_slabs(assessment_year, regime, &slabs).await?;
        }

        Ok(inserted)
    }

    fn group(records: &[TaxSlabRecord]) -> Result<BTreeMap<(i32, Regime), Vec<TaxSlab>>, TaxSlabLoaderError> {
        let mut groups: BTreeMap<(i32, Regime), Vec<TaxSlab>> = BTreeMap::new();
        for record in records {
            let regime = Regime::parse(&record.regime)
                .ok_or_else(|| TaxSlabLoaderError::InvalidRegime(record.regime.clone()))?;
            groups
                .entry((record.assessment_year, regime))
                .or_default()
                .push(TaxSlab {
                    assessment_year: record.assessment_year,
                    regime,
                    min_income: record.min_income,
                    max_income: record.max_income,
                    rate: record.rate,
                });
        }
        for slabs in groups.values_mut() {
            slabs.sort_by_key(|slab| slab.min_income);
        }
        Ok(groups)
    }

    // Only the slab schedule is under test; the rest comes from the
    // statutory parameters and is already valid.
    fn validate(
        assessment_year: i32,
        regime: Regime,
        slabs: &[TaxSlab],
    ) -> Result<(), TaxSlabLoaderError> {
        let params = RegimeParameters {
            slabs: slabs.to_vec(),
            ..RegimeParameters::statutory(regime)
        };
        params
            .validate()
            .map_err(|source| TaxSlabLoaderError::InvalidSchedule {
                assessment_year,
                regime,
                source,
            })
    }
}
