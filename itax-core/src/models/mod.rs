mod deadline;
mod deduction;
mod income;
mod profile;
mod regime;
mod regime_parameters;
mod saved_computation;
mod tax_slab;

pub use deadline::{DeadlineCategory, NewTaxDeadline, TaxDeadline};
pub use deduction::{DeductionItem, DeductionSection, NewDeductionItem};
pub use income::IncomeBreakdown;
pub use profile::{NewUserProfile, ProfileError, UserProfile, normalize_pan};
pub use regime::Regime;
pub use regime_parameters::{DEFAULT_ASSESSMENT_YEAR, RegimeParameters, RegimeParametersError};
pub use saved_computation::{NewSavedComputation, SavedComputation};
pub use tax_slab::{SurchargeBand, TaxSlab};
