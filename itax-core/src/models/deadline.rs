use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineCategory {
    AdvanceTax,
    ReturnFiling,
    Tds,
    Audit,
    Other,
}

impl DeadlineCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdvanceTax => "advance_tax",
            Self::ReturnFiling => "return_filing",
            Self::Tds => "tds",
            Self::Audit => "audit",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "advance_tax" => Some(Self::AdvanceTax),
            "return_filing" => Some(Self::ReturnFiling),
            "tds" => Some(Self::Tds),
            "audit" => Some(Self::Audit),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// An entry of the income-tax calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxDeadline {
    pub id: i64,
    pub assessment_year: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub category: DeadlineCategory,
    pub completed: bool,
}

impl TaxDeadline {
    /// Still open and due before `today`.
    pub fn is_overdue(
        &self,
        today: NaiveDate,
    ) -> bool {
        !self.completed && self.due_date < today
    }

    /// Days from `today` until the due date; negative once past.
    pub fn days_remaining(
        &self,
        today: NaiveDate,
    ) -> i64 {
        (self.due_date - today).num_days()
    }
}

/// For creating new deadlines (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTaxDeadline {
    pub assessment_year: i32,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub category: DeadlineCategory,
}
