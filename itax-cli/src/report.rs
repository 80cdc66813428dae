//! Side-by-side computation report shared by `compute` and `export`.
//!
//! Every number comes from a [`TaxComputationResult`]; nothing here
//! recomputes tax.

use std::io::Write;

use itax_core::{IncomeBreakdown, Recommendation, Regime, RegimeComputation, TaxComputationResult};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::Tabled;

use crate::format::{assessment_year_label, format_percent, format_rupees};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Amount,
    Percent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub item: &'static str,
    pub old: Decimal,
    pub new: Decimal,
    kind: LineKind,
}

/// One displayed row: a line item with both regimes' values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct ReportRow {
    #[tabled(rename = "Item")]
    pub item: String,
    #[tabled(rename = "Old regime")]
    pub old: String,
    #[tabled(rename = "New regime")]
    pub new: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputationReport {
    pub assessment_year: i32,
    pub income: IncomeBreakdown,
    pub lines: Vec<ReportLine>,
    pub recommendation: Recommendation,
}

impl ComputationReport {
    pub fn new(
        assessment_year: i32,
        income: IncomeBreakdown,
        result: &TaxComputationResult,
    ) -> Self {
        let (old, new) = (&result.old, &result.new);
        let amount = |item, field: fn(&RegimeComputation) -> Decimal| ReportLine {
            item,
            old: field(old),
            new: field(new),
            kind: LineKind::Amount,
        };

        let lines = vec![
            amount("Gross income", |c| c.gross_income),
            amount("Standard deduction", |c| c.standard_deduction),
            amount("Deductions", |c| c.deductions_applied),
            amount("Taxable income", |c| c.taxable_income),
            amount("Slab tax", |c| c.base_tax),
            amount("Surcharge", |c| c.surcharge),
            amount("Cess", |c| c.cess),
            amount("Rebate u/s 87A", |c| c.rebate),
            amount("Final tax", |c| c.final_tax),
            ReportLine {
                item: "Effective rate",
                old: old.effective_rate,
                new: new.effective_rate,
                kind: LineKind::Percent,
            },
        ];

        Self {
            assessment_year,
            income,
            lines,
            recommendation: result.recommendation,
        }
    }

    /// Human-readable rows, followed by the recommendation.
    pub fn rows(&self) -> Vec<ReportRow> {
        let mut rows: Vec<_> = self
            .lines
            .iter()
            .map(|line| {
                let render: fn(&Decimal) -> String = match line.kind {
                    LineKind::Amount => format_rupees,
                    LineKind::Percent => format_percent,
                };
                ReportRow {
                    item: line.item.to_string(),
                    old: render(&line.old),
                    new: render(&line.new),
                }
            })
            .collect();
        rows.extend(self.recommendation_rows(format_rupees));
        rows
    }

    /// Writes the report as CSV with plain numbers, one line item per row.
    pub fn write_csv<W: Write>(
        &self,
        writer: W,
    ) -> Result<(), csv::Error> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["item", "old", "new"])?;
        for line in &self.lines {
            csv.write_record([line.item.to_string(), line.old.to_string(), line.new.to_string()])?;
        }
        for row in self.recommendation_rows(|d| d.to_string()) {
            csv.write_record([row.item, row.old, row.new])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// The savings sit in the recommended regime's column.
    fn recommendation_rows(
        &self,
        render: fn(&Decimal) -> String,
    ) -> [ReportRow; 2] {
        let mark = |regime: Regime| {
            if regime == self.recommendation.regime {
                "yes".to_string()
            } else {
                "no".to_string()
            }
        };
        let savings = |regime: Regime| {
            if regime == self.recommendation.regime {
                render(&self.recommendation.savings)
            } else {
                render(&Decimal::ZERO)
            }
        };
        [
            ReportRow {
                item: "Recommended".to_string(),
                old: mark(Regime::Old),
                new: mark(Regime::New),
            },
            ReportRow {
                item: "Savings".to_string(),
                old: savings(Regime::Old),
                new: savings(Regime::New),
            },
        ]
    }

    pub fn summary(&self) -> String {
        format!(
            "AY {}: the {} saves {} over the alternative.",
            assessment_year_label(self.assessment_year),
            self.recommendation.regime.label().to_lowercase(),
            format_rupees(&self.recommendation.savings)
        )
    }
}

#[cfg(test)]
mod tests {
    use itax_core::compute_liability;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn report() -> ComputationReport {
        let income = IncomeBreakdown::salary(dec!(1500000));
        let result = compute_liability(&income, dec!(500000)).unwrap();
        ComputationReport::new(2025, income, &result)
    }

    #[test]
    fn lines_follow_computation_steps() {
        let report = report();

        let items: Vec<_> = report.lines.iter().map(|l| l.item).collect();
        assert_eq!(
            items,
            vec![
                "Gross income",
                "Standard deduction",
                "Deductions",
                "Taxable income",
                "Slab tax",
                "Surcharge",
                "Cess",
                "Rebate u/s 87A",
                "Final tax",
                "Effective rate"
            ]
        );
        let taxable = &report.lines[3];
        assert_eq!((taxable.old, taxable.new), (dec!(950000), dec!(1425000)));
    }

    #[test]
    fn csv_export_has_plain_numbers_and_recommendation() {
        let mut buffer = Vec::new();
        report().write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "item,old,new");
        assert_eq!(lines[1], "Gross income,1500000,1500000");
        assert_eq!(lines[4], "Taxable income,950000,1425000");
        assert_eq!(lines[11], "Recommended,yes,no");
        assert_eq!(lines[12], "Savings,23400,0");
        assert_eq!(lines.len(), 13);
    }

    #[test]
    fn rows_format_amounts_for_display() {
        let rows = report().rows();

        assert_eq!(rows[0].old, "₹15,00,000");
        assert_eq!(rows[9].item, "Effective rate");
        assert!(rows[9].old.ends_with('%'));
        assert_eq!(rows[11].old, "₹23,400");
        assert_eq!(rows[11].new, "₹0");
    }

    #[test]
    fn summary_names_recommended_regime() {
        assert_eq!(
            report().summary(),
            "AY 2025-26: the old regime saves ₹23,400 over the alternative."
        );
    }
}
