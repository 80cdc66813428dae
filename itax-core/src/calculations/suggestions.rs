//! Tax-saving suggestions.
//!
//! For each capped deduction section that still has headroom, the engine is
//! re-run as if the headroom were fully claimed, and the drop in old-regime
//! tax is reported as the estimated saving.

use std::cmp::Reverse;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::deductions::DeductionSummary;
use super::liability::{Recommendation, TaxComputationResult, TaxLiabilityEngine};
use super::LiabilityError;
use crate::models::{DeductionSection, IncomeBreakdown};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsSuggestion {
    pub section: DeductionSection,
    /// Currently allowed under the section.
    pub current: Decimal,
    pub limit: Decimal,
    pub headroom: Decimal,
    /// Old-regime final tax with the headroom claimed.
    pub projected_old_tax: Decimal,
    /// Baseline old-regime tax minus `projected_old_tax`.
    pub estimated_saving: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsReport {
    pub baseline: TaxComputationResult,
    pub deductions: DeductionSummary,
    /// Highest saving first.
    pub suggestions: Vec<SavingsSuggestion>,
}

impl SavingsReport {
    pub fn recommendation(&self) -> Recommendation {
        self.baseline.recommendation
    }

    /// Sum of all estimated savings. Savings do not add exactly when
    /// several sections are maxed at once, because of slab effects.
    pub fn total_estimated_saving(&self) -> Decimal {
        self.suggestions.iter().map(|s| s.estimated_saving).sum()
    }
}

/// Builds a [`SavingsReport`] for `income` given the already-capped
/// `deductions`.
///
/// Sections whose headroom would not change the tax are still listed with
/// a zero saving.
///
/// # Errors
///
/// Propagates [`LiabilityError::InvalidInput`] from the engine.
pub fn suggest_savings(
    engine: &TaxLiabilityEngine,
    income: &IncomeBreakdown,
    deductions: &DeductionSummary,
) -> Result<SavingsReport, LiabilityError> {
    let baseline = engine.compute_liability(income, deductions.total_allowed)?;

    let mut suggestions = Vec::new();
    for section in DeductionSection::ALL {
        let Some(limit) = section.limit() else {
            continue;
        };
        let current = deductions.allowed_for(section);
        let headroom = limit - current;
        if headroom <= Decimal::ZERO {
            continue;
        }

        let projected = engine.compute_liability(income, deductions.total_allowed + headroom)?;
        let estimated_saving = baseline.old.final_tax - projected.old.final_tax;
        debug!(%section, %headroom, %estimated_saving, "evaluated deduction headroom");

        suggestions.push(SavingsSuggestion {
            section,
            current,
            limit,
            headroom,
            projected_old_tax: projected.old.final_tax,
            estimated_saving,
        });
    }
    suggestions.sort_by_key(|s| (Reverse(s.estimated_saving), s.section));

    Ok(SavingsReport {
        baseline,
        deductions: deductions.clone(),
        suggestions,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::deductions::summarize_deductions;

    fn report(
        salary: Decimal,
        claims: Vec<(DeductionSection, Decimal)>,
    ) -> SavingsReport {
        let summary = summarize_deductions(claims).unwrap();
        suggest_savings(
            &TaxLiabilityEngine::default(),
            &IncomeBreakdown::salary(salary),
            &summary,
        )
        .unwrap()
    }

    #[test]
    fn suggestions_are_ordered_by_saving() {
        let report = report(dec!(1500000), Vec::new());

        // baseline old: taxable 1450000, base 247500, cess 9900
        assert_eq!(report.baseline.old.final_tax, dec!(257400));
        let ranked: Vec<_> = report
            .suggestions
            .iter()
            .map(|s| (s.section, s.estimated_saving))
            .collect();
        assert_eq!(
            ranked,
            vec![
                (DeductionSection::Section24b, dec!(62400)),
                (DeductionSection::Section80C, dec!(46800)),
                (DeductionSection::Section80Ccd1b, dec!(15600)),
                (DeductionSection::Section80D, dec!(7800)),
                (DeductionSection::Section80Tta, dec!(3120)),
            ]
        );
        assert_eq!(report.total_estimated_saving(), dec!(135720));
    }

    #[test]
    fn projected_tax_comes_from_engine() {
        let report = report(dec!(1500000), Vec::new());
        let engine = TaxLiabilityEngine::default();

        for suggestion in &report.suggestions {
            let direct = engine
                .compute_liability(&IncomeBreakdown::salary(dec!(1500000)), suggestion.headroom)
                .unwrap();
            assert_eq!(suggestion.projected_old_tax, direct.old.final_tax);
        }
    }

    #[test]
    fn exhausted_sections_are_skipped() {
        let report = report(
            dec!(1500000),
            vec![(DeductionSection::Section80C, dec!(200000))],
        );

        assert!(
            report
                .suggestions
                .iter()
                .all(|s| s.section != DeductionSection::Section80C)
        );
        assert_eq!(report.deductions.total_allowed, dec!(150000));
    }

    #[test]
    fn partial_claim_reports_remaining_headroom() {
        let report = report(
            dec!(1500000),
            vec![(DeductionSection::Section80D, dec!(10000))],
        );

        let line = report
            .suggestions
            .iter()
            .find(|s| s.section == DeductionSection::Section80D)
            .unwrap();
        assert_eq!(line.current, dec!(10000));
        assert_eq!(line.headroom, dec!(15000));
    }

    #[test]
    fn zero_savings_are_listed_in_section_order() {
        // Old-regime taxable 250000 is already untaxed.
        let report = report(dec!(300000), Vec::new());

        let sections: Vec<_> = report.suggestions.iter().map(|s| s.section).collect();
        assert_eq!(
            sections,
            vec![
                DeductionSection::Section80C,
                DeductionSection::Section80Ccd1b,
                DeductionSection::Section80D,
                DeductionSection::Section80Tta,
                DeductionSection::Section24b,
            ]
        );
        assert!(report.suggestions.iter().all(|s| s.estimated_saving.is_zero()));
    }

    #[test]
    fn report_carries_baseline_recommendation() {
        let report = report(
            dec!(1500000),
            vec![(DeductionSection::Section80C, dec!(150000))],
        );

        assert_eq!(report.recommendation(), report.baseline.recommendation);
    }
}
