//! Statutory parameters for one regime in one assessment year.
//!
//! The engine never hard-codes a rate or threshold: everything it needs is
//! carried by [`RegimeParameters`]. The built-in constructors hold the
//! AY 2025-26 values; other years come from the repository.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Regime, SurchargeBand, TaxSlab};

/// Assessment year covered by the built-in parameters (AY 2025-26).
pub const DEFAULT_ASSESSMENT_YEAR: i32 = 2025;

/// Reasons a parameter set cannot be used for computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegimeParametersError {
    #[error("slab schedule is empty")]
    NoSlabs,

    #[error("first slab must start at 0, starts at {0}")]
    FirstSlabNotZero(Decimal),

    #[error("slab starting at {found} does not continue from previous upper bound {expected}")]
    SlabGap { expected: Decimal, found: Decimal },

    #[error("slab starting at {0} has an upper bound that is not above its lower bound")]
    EmptySlab(Decimal),

    #[error("only the last slab may be open-ended")]
    OpenSlabNotLast,

    #[error("last slab must be open-ended")]
    MissingOpenSlab,

    #[error("rate must be between 0 and 1, got {0}")]
    InvalidRate(Decimal),

    #[error("surcharge thresholds must be strictly increasing, {0} is out of order")]
    UnorderedSurcharge(Decimal),

    #[error("{field} must be non-negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("parameters are for the {0} regime")]
    WrongRegime(Regime),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeParameters {
    /// First calendar year of the assessment year (2025 means AY 2025-26).
    pub assessment_year: i32,
    pub regime: Regime,
    /// Flat deduction granted when salary income is present.
    pub standard_deduction: Decimal,
    /// Section 87A: taxable income at or below this receives the rebate.
    pub rebate_ceiling: Decimal,
    /// Section 87A: maximum rebate.
    pub rebate_cap: Decimal,
    /// Health and education cess on (base tax + surcharge).
    pub cess_rate: Decimal,
    /// Whether Chapter VI-A style itemized deductions reduce taxable income.
    pub allows_itemized_deductions: bool,
    /// Marginal bands, ascending and contiguous.
    pub slabs: Vec<TaxSlab>,
    /// Surcharge steps, ascending by threshold.
    pub surcharge_bands: Vec<SurchargeBand>,
}

impl RegimeParameters {
    /// Built-in parameters for `regime` in AY 2025-26.
    pub fn statutory(regime: Regime) -> Self {
        match regime {
            Regime::Old => Self::old_regime(),
            Regime::New => Self::new_regime(),
        }
    }

    /// Old regime, AY 2025-26.
    pub fn old_regime() -> Self {
        let year = DEFAULT_ASSESSMENT_YEAR;
        Self {
            assessment_year: year,
            regime: Regime::Old,
            standard_deduction: rupees(50_000),
            rebate_ceiling: rupees(500_000),
            rebate_cap: rupees(12_500),
            cess_rate: percent(4),
            allows_itemized_deductions: true,
            slabs: schedule(
                year,
                Regime::Old,
                &[(0, Some(250_000), 0), (250_000, Some(500_000), 5), (500_000, Some(1_000_000), 20), (1_000_000, None, 30)],
            ),
            surcharge_bands: statutory_surcharge(),
        }
    }

    /// New regime, AY 2025-26.
    pub fn new_regime() -> Self {
        let year = DEFAULT_ASSESSMENT_YEAR;
        Self {
            assessment_year: year,
            regime: Regime::New,
            standard_deduction: rupees(75_000),
            rebate_ceiling: rupees(700_000),
            rebate_cap: rupees(25_000),
            cess_rate: percent(4),
            allows_itemized_deductions: false,
            slabs: schedule(
                year,
                Regime::New,
                &[
                    (0, Some(300_000), 0),
                    (300_000, Some(700_000), 5),
                    (700_000, Some(1_000_000), 10),
                    (1_000_000, Some(1_200_000), 15),
                    (1_200_000, Some(1_500_000), 20),
                    (1_500_000, None, 30),
                ],
            ),
            surcharge_bands: statutory_surcharge(),
        }
    }

    /// Checks that the slab schedule is a proper marginal schedule and that
    /// every rate and amount is in range.
    pub fn validate(&self) -> Result<(), RegimeParametersError> {
        for (field, value) in [
            ("standard_deduction", self.standard_deduction),
            ("rebate_ceiling", self.rebate_ceiling),
            ("rebate_cap", self.rebate_cap),
        ] {
            if value < Decimal::ZERO {
                return Err(RegimeParametersError::NegativeAmount { field, value });
            }
        }
        check_rate(self.cess_rate)?;

        let first = self.slabs.first().ok_or(RegimeParametersError::NoSlabs)?;
        if first.min_income != Decimal::ZERO {
            return Err(RegimeParametersError::FirstSlabNotZero(first.min_income));
        }

        let mut expected_min = Decimal::ZERO;
        let last_index = self.slabs.len() - 1;
        for (index, slab) in self.slabs.iter().enumerate() {
            check_rate(slab.rate)?;
            if slab.min_income != expected_min {
                return Err(RegimeParametersError::SlabGap {
                    expected: expected_min,
                    found: slab.min_income,
                });
            }
            match slab.max_income {
                Some(max) if max <= slab.min_income => {
                    return Err(RegimeParametersError::EmptySlab(slab.min_income));
                }
                Some(max) => {
                    if index == last_index {
                        return Err(RegimeParametersError::MissingOpenSlab);
                    }
                    expected_min = max;
                }
                None if index != last_index => return Err(RegimeParametersError::OpenSlabNotLast),
                None => {}
            }
        }

        let mut previous: Option<Decimal> = None;
        for band in &self.surcharge_bands {
            check_rate(band.rate)?;
            if band.threshold < Decimal::ZERO {
                return Err(RegimeParametersError::NegativeAmount {
                    field: "surcharge threshold",
                    value: band.threshold,
                });
            }
            if previous.is_some_and(|p| band.threshold <= p) {
                return Err(RegimeParametersError::UnorderedSurcharge(band.threshold));
            }
            previous = Some(band.threshold);
        }

        Ok(())
    }
}

fn check_rate(rate: Decimal) -> Result<(), RegimeParametersError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(RegimeParametersError::InvalidRate(rate));
    }
    Ok(())
}

fn rupees(amount: i64) -> Decimal {
    Decimal::from(amount)
}

fn percent(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

fn schedule(
    assessment_year: i32,
    regime: Regime,
    bands: &[(i64, Option<i64>, i64)],
) -> Vec<TaxSlab> {
    bands
        .iter()
        .map(|&(min, max, rate)| TaxSlab {
            assessment_year,
            regime,
            min_income: rupees(min),
            max_income: max.map(rupees),
            rate: percent(rate),
        })
        .collect()
}

// 50L / 1Cr / 2Cr / 5Cr
fn statutory_surcharge() -> Vec<SurchargeBand> {
    [(5_000_000, 10), (10_000_000, 15), (20_000_000, 25), (50_000_000, 37)]
        .iter()
        .map(|&(threshold, rate)| SurchargeBand {
            threshold: rupees(threshold),
            rate: percent(rate),
        })
        .collect()
}
