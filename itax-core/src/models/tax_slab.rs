use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Regime;

/// One marginal band of a regime's slab schedule.
///
/// `rate` applies only to the part of taxable income above `min_income` and
/// up to `max_income`. `max_income == None` marks the open top band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSlab {
    pub assessment_year: i32,
    pub regime: Regime,
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxSlab {
    /// Portion of `taxable_income` that falls inside this band.
    pub fn portion_of(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        if taxable_income <= self.min_income {
            return Decimal::ZERO;
        }
        let upper = match self.max_income {
            Some(max) => taxable_income.min(max),
            None => taxable_income,
        };
        upper - self.min_income
    }
}

/// A surcharge step: once taxable income exceeds `threshold`, base tax is
/// surcharged at `rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurchargeBand {
    pub threshold: Decimal,
    pub rate: Decimal,
}
