//! Section-wise capping of itemized deductions.
//!
//! Claims are grouped by section, summed, then capped at the section's
//! statutory limit. The capped total is what the liability engine receives.
//!
//! | Section   | Limit    |
//! |-----------|----------|
//! | 80C       | 1,50,000 |
//! | 80CCD(1B) | 50,000   |
//! | 80D       | 25,000   |
//! | 24(b)     | 2,00,000 |
//! | 80TTA     | 10,000   |
//! | 80E, 80G, other | none |

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::LiabilityError;
use super::common::ensure_amount;
use crate::models::{DeductionItem, DeductionSection};

/// Claimed and allowed amounts for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDeduction {
    pub section: DeductionSection,
    pub claimed: Decimal,
    pub limit: Option<Decimal>,
    pub allowed: Decimal,
}

impl SectionDeduction {
    /// Amount that could still be claimed before the limit is reached.
    /// `None` for uncapped sections.
    pub fn headroom(&self) -> Option<Decimal> {
        self.limit.map(|limit| (limit - self.allowed).max(Decimal::ZERO))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionSummary {
    /// One entry per claimed section, in section order.
    pub sections: Vec<SectionDeduction>,
    pub total_claimed: Decimal,
    /// The deduction total fed to the liability engine.
    pub total_allowed: Decimal,
}

impl DeductionSummary {
    pub fn section(
        &self,
        section: DeductionSection,
    ) -> Option<&SectionDeduction> {
        self.sections.iter().find(|line| line.section == section)
    }

    /// Allowed amount for `section`, zero when nothing was claimed.
    pub fn allowed_for(
        &self,
        section: DeductionSection,
    ) -> Decimal {
        self.section(section).map_or(Decimal::ZERO, |line| line.allowed)
    }
}

/// Sums and caps `(section, amount)` claims.
///
/// # Errors
///
/// Returns [`LiabilityError::InvalidInput`] for a negative or oversized claim.
pub fn summarize_deductions<I>(claims: I) -> Result<DeductionSummary, LiabilityError>
where
    I: IntoIterator<Item = (DeductionSection, Decimal)>,
{
    let mut claimed: BTreeMap<DeductionSection, Decimal> = BTreeMap::new();
    for (section, amount) in claims {
        ensure_amount(section.as_str(), amount)?;
        let total = claimed.entry(section).or_default();
        *total = total
            .checked_add(amount)
            .ok_or_else(|| LiabilityError::invalid_input(section.as_str(), "claims are too large to add up"))?;
    }

    let sections: Vec<SectionDeduction> = claimed
        .into_iter()
        .map(|(section, claimed)| {
            let limit = section.limit();
            let allowed = limit.map_or(claimed, |limit| claimed.min(limit));
            SectionDeduction {
                section,
                claimed,
                limit,
                allowed,
            }
        })
        .collect();

    Ok(DeductionSummary {
        total_claimed: sections.iter().map(|line| line.claimed).sum(),
        total_allowed: sections.iter().map(|line| line.allowed).sum(),
        sections,
    })
}

/// Convenience over [`summarize_deductions`] for stored line items.
pub fn summarize_items(items: &[DeductionItem]) -> Result<DeductionSummary, LiabilityError> {
    summarize_deductions(items.iter().map(|item| (item.section, item.amount)))
}
