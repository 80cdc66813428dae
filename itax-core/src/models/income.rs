use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Income by head, in whole rupees.
///
/// Built fresh from user input for every computation; callers that want to
/// keep it (income history) persist it through the repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeBreakdown {
    pub salary: Decimal,
    pub house_property: Decimal,
    pub business_profession: Decimal,
    pub capital_gains: Decimal,
    pub other_sources: Decimal,
}

impl IncomeBreakdown {
    /// Income consisting of salary only.
    pub fn salary(amount: Decimal) -> Self {
        Self {
            salary: amount,
            ..Default::default()
        }
    }

    /// Gross total income: the sum of all five heads.
    pub fn gross_total(&self) -> Decimal {
        self.salary
            + self.house_property
            + self.business_profession
            + self.capital_gains
            + self.other_sources
    }

    /// Field name / amount pairs, in statutory head order.
    pub fn heads(&self) -> [(&'static str, Decimal); 5] {
        [
            ("salary", self.salary),
            ("house_property", self.house_property),
            ("business_profession", self.business_profession),
            ("capital_gains", self.capital_gains),
            ("other_sources", self.other_sources),
        ]
    }
}
