//! Tax calculations.
//!
//! [`liability`] holds the engine; everything else in this module either
//! prepares its inputs ([`deductions`]) or consumes its results
//! ([`suggestions`], [`advance_tax`]).

pub mod advance_tax;
pub mod common;
pub mod deductions;
mod error;
pub mod liability;
pub mod suggestions;

pub use advance_tax::{AdvanceTaxInstalment, AdvanceTaxSchedule};
pub use deductions::{DeductionSummary, SectionDeduction, summarize_deductions, summarize_items};
pub use error::LiabilityError;
pub use liability::{
    Recommendation, RegimeComputation, TaxComputationResult, TaxLiabilityEngine, compute_liability,
};
pub use suggestions::{SavingsReport, SavingsSuggestion, suggest_savings};
