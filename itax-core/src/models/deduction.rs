use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sections under which an itemized deduction can be claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeductionSection {
    /// Life insurance, PPF, ELSS, principal repayment, ...
    Section80C,
    /// Additional NPS contribution.
    Section80Ccd1b,
    /// Health insurance premium.
    Section80D,
    /// Education loan interest.
    Section80E,
    /// Donations.
    Section80G,
    /// Savings account interest.
    Section80Tta,
    /// Interest on a self-occupied home loan.
    Section24b,
    Other,
}

impl DeductionSection {
    pub const ALL: [DeductionSection; 8] = [
        Self::Section80C,
        Self::Section80Ccd1b,
        Self::Section80D,
        Self::Section80E,
        Self::Section80G,
        Self::Section80Tta,
        Self::Section24b,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Section80C => "80C",
            Self::Section80Ccd1b => "80CCD(1B)",
            Self::Section80D => "80D",
            Self::Section80E => "80E",
            Self::Section80G => "80G",
            Self::Section80Tta => "80TTA",
            Self::Section24b => "24(b)",
            Self::Other => "OTHER",
        }
    }

    /// Accepts the display code, case-insensitively and with or without
    /// punctuation (`80ccd1b`, `24b`).
    pub fn parse(s: &str) -> Option<Self> {
        let wanted = compact(s);
        Self::ALL
            .into_iter()
            .find(|section| compact(section.as_str()) == wanted)
    }

    /// Statutory ceiling on the amount claimable under this section, if any.
    pub fn limit(&self) -> Option<Decimal> {
        match self {
            Self::Section80C => Some(Decimal::from(150_000)),
            Self::Section80Ccd1b => Some(Decimal::from(50_000)),
            Self::Section80D => Some(Decimal::from(25_000)),
            Self::Section80Tta => Some(Decimal::from(10_000)),
            Self::Section24b => Some(Decimal::from(200_000)),
            Self::Section80E | Self::Section80G | Self::Other => None,
        }
    }
}

fn compact(code: &str) -> String {
    code.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

impl fmt::Display for DeductionSection {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An itemized deduction line item belonging to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionItem {
    pub id: i64,
    pub profile_id: i64,
    pub assessment_year: i32,
    pub section: DeductionSection,
    pub description: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// For creating new line items (no id or timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeductionItem {
    pub profile_id: i64,
    pub assessment_year: i32,
    pub section: DeductionSection,
    pub description: String,
    pub amount: Decimal,
}
