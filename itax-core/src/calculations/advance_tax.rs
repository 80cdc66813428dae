//! Advance-tax instalments for a financial year.
//!
//! Advance tax is due when the liability left after TDS is at least
//! ₹10,000. It is paid in four instalments with cumulative targets:
//!
//! | Due date          | Cumulative |
//! |-------------------|------------|
//! | 15 June           | 15%        |
//! | 15 September      | 45%        |
//! | 15 December       | 75%        |
//! | 15 March (next)   | 100%       |
//!
//! Each cumulative target is rounded to the rupee and each instalment is
//! the difference from the previous target, so the instalments always add
//! up to the net liability.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::LiabilityError;
use super::common::{ensure_amount, floor_zero, round_to_rupee};

/// Net liability below this needs no advance tax.
pub const ADVANCE_TAX_THRESHOLD: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

// (month, day, cumulative percent); March falls in the next calendar year.
const INSTALMENTS: [(u32, u32, i64); 4] = [(6, 15, 15), (9, 15, 45), (12, 15, 75), (3, 15, 100)];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceTaxInstalment {
    pub due_date: NaiveDate,
    /// Share of the net liability that must be paid by `due_date`.
    pub cumulative_percent: Decimal,
    pub cumulative_amount: Decimal,
    /// Amount payable in this instalment.
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceTaxSchedule {
    /// Calendar year in which the financial year starts (2024 for FY 2024-25).
    pub financial_year_start: i32,
    pub final_tax: Decimal,
    pub tds: Decimal,
    /// Final tax less TDS, floored at zero, whole rupees.
    pub net_liability: Decimal,
    pub required: bool,
    /// Empty when `required` is false.
    pub instalments: Vec<AdvanceTaxInstalment>,
}

impl AdvanceTaxSchedule {
    /// Builds the schedule for `final_tax` less `tds`.
    ///
    /// # Errors
    ///
    /// Returns [`LiabilityError::InvalidInput`] if either amount is negative
    /// or if `financial_year_start` has no calendar dates.
    pub fn from_liability(
        final_tax: Decimal,
        tds: Decimal,
        financial_year_start: i32,
    ) -> Result<Self, LiabilityError> {
        ensure_amount("final_tax", final_tax)?;
        ensure_amount("tds", tds)?;

        let net_liability = round_to_rupee(floor_zero(final_tax - tds));
        let required = net_liability >= ADVANCE_TAX_THRESHOLD;

        let mut instalments = Vec::new();
        if required {
            let mut paid = Decimal::ZERO;
            for (month, day, percent) in INSTALMENTS {
                let year = if month < 4 {
                    financial_year_start + 1
                } else {
                    financial_year_start
                };
                let due_date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
                    LiabilityError::invalid_input(
                        "financial_year_start",
                        format!("{financial_year_start} is out of range"),
                    )
                })?;
                let cumulative_percent = Decimal::from(percent);
                let cumulative_amount = round_to_rupee(net_liability * cumulative_percent / Decimal::ONE_HUNDRED);
                instalments.push(AdvanceTaxInstalment {
                    due_date,
                    cumulative_percent,
                    cumulative_amount,
                    amount: cumulative_amount - paid,
                });
                paid = cumulative_amount;
            }
        }

        Ok(Self {
            financial_year_start,
            final_tax,
            tds,
            net_liability,
            required,
            instalments,
        })
    }

    /// First instalment due on or after `today`.
    pub fn next_due(
        &self,
        today: NaiveDate,
    ) -> Option<&AdvanceTaxInstalment> {
        self.instalments.iter().find(|i| i.due_date >= today)
    }

    pub fn total(&self) -> Decimal {
        self.instalments.iter().map(|i| i.amount).sum()
    }
}
