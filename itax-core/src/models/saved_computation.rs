use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{IncomeBreakdown, Regime};
use crate::calculations::TaxComputationResult;

/// One entry of a user's income history: the inputs of a computation and
/// the headline numbers it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedComputation {
    pub id: i64,
    pub profile_id: Option<i64>,
    pub assessment_year: i32,

    // Inputs
    pub income: IncomeBreakdown,
    pub deductions: Decimal,

    // Results
    pub old_final_tax: Decimal,
    pub new_final_tax: Decimal,
    pub recommended_regime: Regime,
    pub savings: Decimal,

    pub created_at: DateTime<Utc>,
}

/// For saving new computations (no id or timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSavedComputation {
    pub profile_id: Option<i64>,
    pub assessment_year: i32,
    pub income: IncomeBreakdown,
    pub deductions: Decimal,
    pub old_final_tax: Decimal,
    pub new_final_tax: Decimal,
    pub recommended_regime: Regime,
    pub savings: Decimal,
}

impl NewSavedComputation {
    /// Captures the inputs of a computation together with its headline
    /// numbers.
    pub fn from_result(
        profile_id: Option<i64>,
        assessment_year: i32,
        income: IncomeBreakdown,
        deductions: Decimal,
        result: &TaxComputationResult,
    ) -> Self {
        Self {
            profile_id,
            assessment_year,
            income,
            deductions,
            old_final_tax: result.old.final_tax,
            new_final_tax: result.new.final_tax,
            recommended_regime: result.recommendation.regime,
            savings: result.recommendation.savings,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::compute_liability;

    #[test]
    fn from_result_copies_headline_numbers() {
        let income = IncomeBreakdown::salary(dec!(1500000));
        let result = compute_liability(&income, dec!(500000)).unwrap();

        let saved = NewSavedComputation::from_result(Some(3), 2025, income, dec!(500000), &result);

        assert_eq!(saved.profile_id, Some(3));
        assert_eq!(saved.old_final_tax, result.old.final_tax);
        assert_eq!(saved.new_final_tax, result.new.final_tax);
        assert_eq!(saved.recommended_regime, Regime::Old);
        assert_eq!(saved.savings, dec!(23400));
    }
}
