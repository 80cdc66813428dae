//! Income-tax liability under the old and new regimes.
//!
//! Every caller that needs a tax figure goes through [`TaxLiabilityEngine`];
//! the report export and the savings suggestions never re-derive the slab
//! arithmetic themselves.
//!
//! # Computation
//!
//! For each regime, in order:
//!
//! | Step | Value |
//! |------|-------|
//! | 1    | Gross total income: sum of the five heads |
//! | 2    | Standard deduction, only when salary is present (all-or-nothing) |
//! | 3    | Taxable income: gross − standard deduction − itemized deductions (old regime only), floored at 0 |
//! | 4    | Base tax from the marginal slab schedule |
//! | 5    | Surcharge: base tax × the step rate for taxable income |
//! | 6    | Cess: cess rate × (base tax + surcharge), to the rupee |
//! | 7    | Rebate (87A): min(base tax, cap) when taxable income ≤ ceiling |
//! | 8    | Final tax: base + surcharge + cess − rebate, floored at 0, to the rupee |
//! | 9    | Effective rate: final tax ÷ gross income × 100, 2 dp |
//!
//! The cheaper regime is recommended; a tie goes to the new regime.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use itax_core::{IncomeBreakdown, Regime, compute_liability};
//!
//! let income = IncomeBreakdown::salary(dec!(1500000));
//! let result = compute_liability(&income, dec!(500000)).unwrap();
//!
//! assert_eq!(result.old.taxable_income, dec!(950000));
//! assert_eq!(result.new.taxable_income, dec!(1425000));
//! assert_eq!(result.recommendation.regime, Regime::Old);
//! assert_eq!(result.recommendation.savings, dec!(23400));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LiabilityError;
use super::common::{ensure_amount, floor_zero, round_half_up, round_to_rupee};
use crate::models::{IncomeBreakdown, Regime, RegimeParameters, RegimeParametersError};

/// Liability under a single regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeComputation {
    pub regime: Regime,

    /// Sum of all income heads.
    pub gross_income: Decimal,

    /// Standard deduction actually granted (zero without salary income).
    pub standard_deduction: Decimal,

    /// Itemized deductions actually applied (always zero for the new regime).
    pub deductions_applied: Decimal,

    pub taxable_income: Decimal,

    /// Tax from the slab schedule, before surcharge, cess and rebate.
    pub base_tax: Decimal,

    /// Step rate selected for the taxable income (0 below the first threshold).
    pub surcharge_rate: Decimal,
    pub surcharge: Decimal,
    pub cess: Decimal,
    pub rebate: Decimal,

    /// Tax payable, whole rupees, never negative.
    pub final_tax: Decimal,

    /// Final tax as a percentage of gross income, two decimal places.
    pub effective_rate: Decimal,
}

/// Which regime to pick and by how much it wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub regime: Regime,
    /// Absolute difference between the two final tax figures.
    pub savings: Decimal,
}

/// Output of [`TaxLiabilityEngine::compute_liability`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxComputationResult {
    pub gross_income: Decimal,
    pub old: RegimeComputation,
    pub new: RegimeComputation,
    pub recommendation: Recommendation,
}

impl TaxComputationResult {
    pub fn for_regime(
        &self,
        regime: Regime,
    ) -> &RegimeComputation {
        match regime {
            Regime::Old => &self.old,
            Regime::New => &self.new,
        }
    }

    /// The computation for the recommended regime.
    pub fn recommended(&self) -> &RegimeComputation {
        self.for_regime(self.recommendation.regime)
    }

    /// True when there is no income at all; presentation layers show a
    /// placeholder instead of a zero-tax result.
    pub fn is_idle(&self) -> bool {
        self.gross_income.is_zero()
    }
}

/// Computes liability under both regimes from a pair of parameter sets.
///
/// The engine is a plain value: it holds no state between calls, and equal
/// inputs always produce equal results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxLiabilityEngine {
    old: RegimeParameters,
    new: RegimeParameters,
}

impl Default for TaxLiabilityEngine {
    /// Engine using the built-in AY 2025-26 parameters.
    fn default() -> Self {
        Self {
            old: RegimeParameters::old_regime(),
            new: RegimeParameters::new_regime(),
        }
    }
}

impl TaxLiabilityEngine {
    /// Creates an engine from explicit parameters, validating both.
    ///
    /// # Errors
    ///
    /// Returns [`LiabilityError::InvalidParameters`] if either parameter set
    /// fails [`RegimeParameters::validate`], or if a set is passed in the
    /// wrong slot.
    pub fn new(
        old: RegimeParameters,
        new: RegimeParameters,
    ) -> Result<Self, LiabilityError> {
        for (expected, params) in [(Regime::Old, &old), (Regime::New, &new)] {
            if params.regime != expected {
                return Err(LiabilityError::InvalidParameters {
                    regime: expected,
                    source: RegimeParametersError::WrongRegime(params.regime),
                });
            }
            params
                .validate()
                .map_err(|source| LiabilityError::InvalidParameters {
                    regime: expected,
                    source,
                })?;
        }
        Ok(Self { old, new })
    }

    pub fn parameters(
        &self,
        regime: Regime,
    ) -> &RegimeParameters {
        match regime {
            Regime::Old => &self.old,
            Regime::New => &self.new,
        }
    }

    /// Computes taxable income and liability under both regimes and
    /// recommends the cheaper one.
    ///
    /// `deductions` is the total of itemized deductions; it only reduces
    /// old-regime taxable income.
    ///
    /// # Errors
    ///
    /// Returns [`LiabilityError::InvalidInput`] naming the first income head
    /// that is negative or above [`MAX_AMOUNT`](super::common::MAX_AMOUNT),
    /// or `deductions` if that is out of range.
    pub fn compute_liability(
        &self,
        income: &IncomeBreakdown,
        deductions: Decimal,
    ) -> Result<TaxComputationResult, LiabilityError> {
        for (field, amount) in income.heads() {
            ensure_amount(field, amount)?;
        }
        ensure_amount("deductions", deductions)?;

        let gross_income = income.gross_total();
        let has_salary = income.salary > Decimal::ZERO;

        let old = self.compute_regime(&self.old, gross_income, has_salary, deductions);
        let new = self.compute_regime(&self.new, gross_income, has_salary, deductions);
        let recommendation = self.recommend(&old, &new);

        debug!(
            %gross_income,
            old_final = %old.final_tax,
            new_final = %new.final_tax,
            recommended = %recommendation.regime,
            "computed liability"
        );

        Ok(TaxComputationResult {
            gross_income,
            old,
            new,
            recommendation,
        })
    }

    fn compute_regime(
        &self,
        params: &RegimeParameters,
        gross_income: Decimal,
        has_salary: bool,
        deductions: Decimal,
    ) -> RegimeComputation {
        let standard_deduction = if has_salary {
            params.standard_deduction
        } else {
            Decimal::ZERO
        };
        let deductions_applied = if params.allows_itemized_deductions {
            deductions
        } else {
            Decimal::ZERO
        };

        let taxable_income = self.taxable_income(gross_income, standard_deduction, deductions_applied);
        let base_tax = self.slab_tax(params, taxable_income);
        let surcharge_rate = self.surcharge_rate(params, taxable_income);
        let surcharge = round_half_up(base_tax * surcharge_rate);
        let cess = self.cess(params, base_tax, surcharge);
        let rebate = self.rebate(params, taxable_income, base_tax);
        let final_tax = round_to_rupee(floor_zero(base_tax + surcharge + cess - rebate));
        let effective_rate = self.effective_rate(final_tax, gross_income);

        RegimeComputation {
            regime: params.regime,
            gross_income,
            standard_deduction,
            deductions_applied,
            taxable_income,
            base_tax,
            surcharge_rate,
            surcharge,
            cess,
            rebate,
            final_tax,
            effective_rate,
        }
    }

    fn taxable_income(
        &self,
        gross_income: Decimal,
        standard_deduction: Decimal,
        deductions: Decimal,
    ) -> Decimal {
        floor_zero(gross_income - standard_deduction - deductions)
    }

    /// Sums the marginal tax of every band the income reaches.
    fn slab_tax(
        &self,
        params: &RegimeParameters,
        taxable_income: Decimal,
    ) -> Decimal {
        let tax: Decimal = params
            .slabs
            .iter()
            .map(|slab| slab.portion_of(taxable_income) * slab.rate)
            .sum();
        round_half_up(tax)
    }

    /// Rate of the highest band whose threshold the income exceeds.
    fn surcharge_rate(
        &self,
        params: &RegimeParameters,
        taxable_income: Decimal,
    ) -> Decimal {
        params
            .surcharge_bands
            .iter()
            .rev()
            .find(|band| taxable_income > band.threshold)
            .map_or(Decimal::ZERO, |band| band.rate)
    }

    fn cess(
        &self,
        params: &RegimeParameters,
        base_tax: Decimal,
        surcharge: Decimal,
    ) -> Decimal {
        round_to_rupee((base_tax + surcharge) * params.cess_rate)
    }

    /// Eligibility is judged on taxable income, not gross income.
    fn rebate(
        &self,
        params: &RegimeParameters,
        taxable_income: Decimal,
        base_tax: Decimal,
    ) -> Decimal {
        if taxable_income <= params.rebate_ceiling {
            base_tax.min(params.rebate_cap)
        } else {
            Decimal::ZERO
        }
    }

    fn effective_rate(
        &self,
        final_tax: Decimal,
        gross_income: Decimal,
    ) -> Decimal {
        if gross_income.is_zero() {
            return Decimal::ZERO;
        }
        round_half_up(final_tax / gross_income * Decimal::ONE_HUNDRED)
    }

    fn recommend(
        &self,
        old: &RegimeComputation,
        new: &RegimeComputation,
    ) -> Recommendation {
        let regime = if new.final_tax <= old.final_tax {
            Regime::New
        } else {
            Regime::Old
        };
        Recommendation {
            regime,
            savings: (new.final_tax - old.final_tax).abs(),
        }
    }
}

/// Computes liability with the built-in AY 2025-26 parameters.
///
/// Shorthand for `TaxLiabilityEngine::default().compute_liability(..)`.
pub fn compute_liability(
    income: &IncomeBreakdown,
    deductions: Decimal,
) -> Result<TaxComputationResult, LiabilityError> {
    TaxLiabilityEngine::default().compute_liability(income, deductions)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::common::MAX_AMOUNT;

    fn engine() -> TaxLiabilityEngine {
        TaxLiabilityEngine::default()
    }

    /// Income with no salary, so no standard deduction: taxable == gross.
    fn business(amount: Decimal) -> IncomeBreakdown {
        IncomeBreakdown {
            business_profession: amount,
            ..Default::default()
        }
    }

    // =========================================================================
    // slab_tax tests
    // =========================================================================

    #[test]
    fn new_regime_band_boundaries_sum_completed_bands() {
        let engine = engine();
        let params = RegimeParameters::new_regime();

        assert_eq!(engine.slab_tax(&params, dec!(300000)), dec!(0));
        // 400000 × 5%
        assert_eq!(engine.slab_tax(&params, dec!(700000)), dec!(20000));
        // + 300000 × 10%
        assert_eq!(engine.slab_tax(&params, dec!(1000000)), dec!(50000));
        // + 200000 × 15%
        assert_eq!(engine.slab_tax(&params, dec!(1200000)), dec!(80000));
        // + 300000 × 20%
        assert_eq!(engine.slab_tax(&params, dec!(1500000)), dec!(140000));
    }

    #[test]
    fn old_regime_band_boundaries_sum_completed_bands() {
        let engine = engine();
        let params = RegimeParameters::old_regime();

        assert_eq!(engine.slab_tax(&params, dec!(250000)), dec!(0));
        assert_eq!(engine.slab_tax(&params, dec!(500000)), dec!(12500));
        assert_eq!(engine.slab_tax(&params, dec!(1000000)), dec!(112500));
        assert_eq!(engine.slab_tax(&params, dec!(1200000)), dec!(172500));
    }

    #[test]
    fn slab_tax_is_marginal_not_flat() {
        let engine = engine();
        let params = RegimeParameters::new_regime();

        // 400000 × 5% + 1 × 10%, not 700001 × 10%
        assert_eq!(engine.slab_tax(&params, dec!(700001)), dec!(20000.10));
    }

    #[test]
    fn slab_tax_is_monotonic() {
        let engine = engine();
        for params in [RegimeParameters::old_regime(), RegimeParameters::new_regime()] {
            let mut previous = Decimal::ZERO;
            let mut income = Decimal::ZERO;
            while income <= dec!(6000000) {
                let tax = engine.slab_tax(&params, income);
                assert!(
                    tax >= previous,
                    "{} regime tax decreased at {income}",
                    params.regime
                );
                previous = tax;
                income += dec!(12500);
            }
        }
    }

    // =========================================================================
    // surcharge tests
    // =========================================================================

    #[test]
    fn surcharge_rate_steps_at_thresholds() {
        let engine = engine();
        let params = RegimeParameters::new_regime();

        assert_eq!(engine.surcharge_rate(&params, dec!(5000000)), dec!(0));
        assert_eq!(engine.surcharge_rate(&params, dec!(5000001)), dec!(0.10));
        assert_eq!(engine.surcharge_rate(&params, dec!(10000000)), dec!(0.10));
        assert_eq!(engine.surcharge_rate(&params, dec!(10000001)), dec!(0.15));
        assert_eq!(engine.surcharge_rate(&params, dec!(20000000)), dec!(0.15));
        assert_eq!(engine.surcharge_rate(&params, dec!(20000001)), dec!(0.25));
        assert_eq!(engine.surcharge_rate(&params, dec!(50000000)), dec!(0.25));
        assert_eq!(engine.surcharge_rate(&params, dec!(50000001)), dec!(0.37));
    }

    #[test]
    fn sixty_lakh_attracts_ten_percent_surcharge() {
        let result = engine().compute_liability(&business(dec!(6000000)), dec!(0)).unwrap();

        // 140000 + 4500000 × 30%
        assert_eq!(result.new.base_tax, dec!(1490000));
        assert_eq!(result.new.surcharge_rate, dec!(0.10));
        assert_eq!(result.new.surcharge, dec!(149000));
        assert_eq!(result.new.cess, dec!(65560));
        assert_eq!(result.new.final_tax, dec!(1704560));
    }

    #[test]
    fn one_point_two_crore_attracts_fifteen_percent_surcharge() {
        let result = engine().compute_liability(&business(dec!(12000000)), dec!(0)).unwrap();

        assert_eq!(result.new.base_tax, dec!(3290000));
        assert_eq!(result.new.surcharge_rate, dec!(0.15));
        assert_eq!(result.new.surcharge, dec!(493500));
        assert_eq!(result.new.cess, dec!(151340));
        assert_eq!(result.new.final_tax, dec!(3934840));
    }

    #[test]
    fn no_surcharge_below_fifty_lakh() {
        let result = engine().compute_liability(&business(dec!(4999999)), dec!(0)).unwrap();

        assert_eq!(result.new.surcharge, dec!(0));
        assert_eq!(result.old.surcharge, dec!(0));
    }

    // =========================================================================
    // rebate tests
    // =========================================================================

    #[test]
    fn new_regime_rebate_applies_at_exactly_seven_lakh_taxable() {
        // 775000 salary − 75000 standard deduction = 700000 taxable
        let result = engine()
            .compute_liability(&IncomeBreakdown::salary(dec!(775000)), dec!(0))
            .unwrap();

        assert_eq!(result.new.taxable_income, dec!(700000));
        assert_eq!(result.new.base_tax, dec!(20000));
        assert_eq!(result.new.rebate, dec!(20000));
        assert_eq!(result.new.final_tax, dec!(800));
    }

    #[test]
    fn new_regime_rebate_lost_one_rupee_above_ceiling() {
        let result = engine()
            .compute_liability(&IncomeBreakdown::salary(dec!(775001)), dec!(0))
            .unwrap();

        assert_eq!(result.new.taxable_income, dec!(700001));
        assert_eq!(result.new.base_tax, dec!(20000.10));
        assert_eq!(result.new.rebate, dec!(0));
        assert_eq!(result.new.cess, dec!(800));
        assert_eq!(result.new.final_tax, dec!(20800));
    }

    #[test]
    fn old_regime_rebate_applies_at_exactly_five_lakh_taxable() {
        let result = engine().compute_liability(&business(dec!(500000)), dec!(0)).unwrap();

        assert_eq!(result.old.taxable_income, dec!(500000));
        assert_eq!(result.old.base_tax, dec!(12500));
        assert_eq!(result.old.rebate, dec!(12500));
        assert_eq!(result.old.final_tax, dec!(500));
    }

    #[test]
    fn old_regime_rebate_lost_one_rupee_above_ceiling() {
        let result = engine().compute_liability(&business(dec!(500001)), dec!(0)).unwrap();

        assert_eq!(result.old.taxable_income, dec!(500001));
        assert_eq!(result.old.base_tax, dec!(12500.20));
        assert_eq!(result.old.rebate, dec!(0));
        assert_eq!(result.old.final_tax, dec!(13000));
    }

    #[test]
    fn rebate_is_capped() {
        let engine = engine();
        let params = RegimeParameters::new_regime();

        // A base tax above the cap can only arise with custom parameters,
        // so exercise the helper directly.
        assert_eq!(engine.rebate(&params, dec!(650000), dec!(40000)), dec!(25000));
        assert_eq!(engine.rebate(&params, dec!(650000), dec!(17500)), dec!(17500));
    }

    #[test]
    fn rebate_eligibility_uses_taxable_not_gross_income() {
        // Gross 800000 exceeds the ceiling, taxable 650000 does not.
        let result = engine()
            .compute_liability(&IncomeBreakdown::salary(dec!(725000)), dec!(0))
            .unwrap();

        assert_eq!(result.new.taxable_income, dec!(650000));
        assert_eq!(result.new.rebate, dec!(17500));
    }

    // =========================================================================
    // scenario tests
    // =========================================================================

    #[test]
    fn zero_income_is_all_zero_and_prefers_new_regime() {
        let result = engine()
            .compute_liability(&IncomeBreakdown::default(), dec!(0))
            .unwrap();

        for computation in [&result.old, &result.new] {
            assert_eq!(computation.taxable_income, dec!(0));
            assert_eq!(computation.base_tax, dec!(0));
            assert_eq!(computation.surcharge, dec!(0));
            assert_eq!(computation.cess, dec!(0));
            assert_eq!(computation.rebate, dec!(0));
            assert_eq!(computation.final_tax, dec!(0));
            assert_eq!(computation.effective_rate, dec!(0));
        }
        assert_eq!(result.recommendation.regime, Regime::New);
        assert_eq!(result.recommendation.savings, dec!(0));
        assert!(result.is_idle());
    }

    #[test]
    fn salary_of_seven_lakh() {
        let result = engine()
            .compute_liability(&IncomeBreakdown::salary(dec!(700000)), dec!(0))
            .unwrap();

        assert_eq!(result.new.standard_deduction, dec!(75000));
        assert_eq!(result.new.taxable_income, dec!(625000));
        // (625000 − 300000) × 5%
        assert_eq!(result.new.base_tax, dec!(16250));
        assert_eq!(result.new.rebate, dec!(16250));
        assert_eq!(result.new.cess, dec!(650));
        // base + surcharge + cess − rebate
        assert_eq!(result.new.final_tax, dec!(650));

        assert_eq!(result.old.standard_deduction, dec!(50000));
        assert_eq!(result.old.taxable_income, dec!(650000));
        // 12500 + 150000 × 20%
        assert_eq!(result.old.base_tax, dec!(42500));
        assert_eq!(result.old.rebate, dec!(0));
        assert_eq!(result.old.final_tax, dec!(44200));

        assert_eq!(result.recommendation.regime, Regime::New);
        assert_eq!(result.recommendation.savings, dec!(43550));
    }

    #[test]
    fn large_deductions_make_old_regime_cheaper() {
        let result = engine()
            .compute_liability(&IncomeBreakdown::salary(dec!(1500000)), dec!(500000))
            .unwrap();

        // old: 1500000 − 50000 − 500000
        assert_eq!(result.old.taxable_income, dec!(950000));
        assert_eq!(result.old.base_tax, dec!(102500));
        assert_eq!(result.old.final_tax, dec!(106600));
        // new ignores itemized deductions: 1500000 − 75000
        assert_eq!(result.new.taxable_income, dec!(1425000));
        assert_eq!(result.new.deductions_applied, dec!(0));
        assert_eq!(result.new.base_tax, dec!(125000));
        assert_eq!(result.new.final_tax, dec!(130000));

        assert_eq!(result.recommendation.regime, Regime::Old);
        assert_eq!(
            result.recommendation.savings,
            result.new.final_tax - result.old.final_tax
        );
        assert_eq!(result.recommended().regime, Regime::Old);
    }

    #[test]
    fn standard_deduction_requires_salary() {
        let income = IncomeBreakdown {
            house_property: dec!(400000),
            other_sources: dec!(400000),
            ..Default::default()
        };

        let result = engine().compute_liability(&income, dec!(0)).unwrap();

        assert_eq!(result.new.standard_deduction, dec!(0));
        assert_eq!(result.new.taxable_income, dec!(800000));
    }

    #[test]
    fn standard_deduction_is_not_capped_at_salary() {
        let income = IncomeBreakdown {
            salary: dec!(10000),
            other_sources: dec!(990000),
            ..Default::default()
        };

        let result = engine().compute_liability(&income, dec!(0)).unwrap();

        assert_eq!(result.new.standard_deduction, dec!(75000));
        assert_eq!(result.new.taxable_income, dec!(925000));
    }

    #[test]
    fn deductions_exceeding_income_floor_taxable_at_zero() {
        let result = engine()
            .compute_liability(&IncomeBreakdown::salary(dec!(200000)), dec!(500000))
            .unwrap();

        assert_eq!(result.old.taxable_income, dec!(0));
        assert_eq!(result.old.final_tax, dec!(0));
    }

    #[test]
    fn effective_rate_has_two_decimals() {
        let result = engine().compute_liability(&business(dec!(1234567)), dec!(0)).unwrap();

        // new: base 20000 + 30000 + 234567 × 15% = 85185.05, cess 3407
        assert_eq!(result.new.final_tax, dec!(88592));
        // 88592 / 1234567 × 100 = 7.1759...
        assert_eq!(result.new.effective_rate, dec!(7.18));
    }

    // =========================================================================
    // invariant tests
    // =========================================================================

    #[test]
    fn invariants_hold_across_income_range() {
        let engine = engine();
        let mut salary = Decimal::ZERO;
        while salary <= dec!(60000000) {
            for deductions in [dec!(0), dec!(150000), dec!(400000)] {
                let result = engine
                    .compute_liability(&IncomeBreakdown::salary(salary), deductions)
                    .unwrap();
                for c in [&result.old, &result.new] {
                    assert!(c.final_tax >= Decimal::ZERO);
                    assert!(c.taxable_income >= Decimal::ZERO);
                    assert_eq!(
                        c.cess,
                        round_to_rupee((c.base_tax + c.surcharge) * dec!(0.04))
                    );
                    assert!(c.rebate <= c.base_tax);
                    if c.taxable_income > engine.parameters(c.regime).rebate_ceiling {
                        assert_eq!(c.rebate, dec!(0));
                    }
                }
            }
            salary += dec!(98765);
        }
    }

    #[test]
    fn repeated_calls_are_identical() {
        let engine = engine();
        let income = IncomeBreakdown {
            salary: dec!(1850000),
            capital_gains: dec!(125000),
            ..Default::default()
        };

        let first = engine.compute_liability(&income, dec!(210000)).unwrap();
        let second = engine.compute_liability(&income, dec!(210000)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn free_function_matches_default_engine() {
        let income = IncomeBreakdown::salary(dec!(1100000));

        assert_eq!(
            compute_liability(&income, dec!(0)),
            engine().compute_liability(&income, dec!(0))
        );
    }

    // =========================================================================
    // input validation tests
    // =========================================================================

    #[test]
    fn negative_income_head_is_invalid_input() {
        let income = IncomeBreakdown {
            salary: dec!(500000),
            capital_gains: dec!(-1),
            ..Default::default()
        };

        let result = engine().compute_liability(&income, dec!(0));

        assert_eq!(
            result,
            Err(LiabilityError::InvalidInput {
                field: "capital_gains".to_string(),
                reason: "must not be negative, got -1".to_string(),
            })
        );
    }

    #[test]
    fn negative_deductions_are_invalid_input() {
        let result = engine().compute_liability(&IncomeBreakdown::salary(dec!(500000)), dec!(-50));

        assert!(matches!(
            result,
            Err(LiabilityError::InvalidInput { ref field, .. }) if field == "deductions"
        ));
    }

    #[test]
    fn oversized_income_heads_are_invalid_input() {
        let income = IncomeBreakdown {
            salary: Decimal::MAX,
            other_sources: Decimal::MAX,
            ..Default::default()
        };

        let result = engine().compute_liability(&income, dec!(0));

        assert!(matches!(
            result,
            Err(LiabilityError::InvalidInput { ref field, .. }) if field == "salary"
        ));
    }

    #[test]
    fn every_head_at_the_ceiling_still_computes() {
        let income = IncomeBreakdown {
            salary: MAX_AMOUNT,
            house_property: MAX_AMOUNT,
            business_profession: MAX_AMOUNT,
            capital_gains: MAX_AMOUNT,
            other_sources: MAX_AMOUNT,
        };

        let result = engine().compute_liability(&income, MAX_AMOUNT).unwrap();

        assert_eq!(result.gross_income, MAX_AMOUNT * dec!(5));
        assert!(result.old.final_tax > result.old.base_tax);
    }

    // =========================================================================
    // construction tests
    // =========================================================================

    #[test]
    fn new_rejects_invalid_parameters() {
        let mut new = RegimeParameters::new_regime();
        new.cess_rate = dec!(4);

        let result = TaxLiabilityEngine::new(RegimeParameters::old_regime(), new);

        assert_eq!(
            result,
            Err(LiabilityError::InvalidParameters {
                regime: Regime::New,
                source: RegimeParametersError::InvalidRate(dec!(4)),
            })
        );
    }

    #[test]
    fn new_rejects_swapped_parameters() {
        let result =
            TaxLiabilityEngine::new(RegimeParameters::new_regime(), RegimeParameters::old_regime());

        assert_eq!(
            result,
            Err(LiabilityError::InvalidParameters {
                regime: Regime::Old,
                source: RegimeParametersError::WrongRegime(Regime::New),
            })
        );
    }

    #[test]
    fn custom_parameters_flow_through() {
        let mut new = RegimeParameters::new_regime();
        new.standard_deduction = dec!(50000);
        let engine = TaxLiabilityEngine::new(RegimeParameters::old_regime(), new).unwrap();

        let result = engine
            .compute_liability(&IncomeBreakdown::salary(dec!(700000)), dec!(0))
            .unwrap();

        assert_eq!(result.new.taxable_income, dec!(650000));
    }
}
