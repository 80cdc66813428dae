pub mod calculations;
pub mod db;
pub mod models;

pub use calculations::{
    AdvanceTaxInstalment, AdvanceTaxSchedule, DeductionSummary, LiabilityError, Recommendation,
    RegimeComputation, SavingsReport, SavingsSuggestion, SectionDeduction, TaxComputationResult,
    TaxLiabilityEngine, compute_liability, suggest_savings, summarize_deductions, summarize_items,
};
pub use db::{DbConfig, RepositoryError, RepositoryFactory, RepositoryRegistry, TaxRepository};
pub use models::*;
