use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    DeductionItem, NewDeductionItem, NewSavedComputation, NewTaxDeadline, NewUserProfile, Regime,
    RegimeParameters, SavedComputation, TaxDeadline, TaxSlab, UserProfile,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for statutory parameters and the user's own records.
///
/// The liability engine never talks to a repository; callers load
/// [`RegimeParameters`] here and hand plain values to the engine.
#[async_trait]
pub trait TaxRepository: Send + Sync {
    // Regime parameters
    async fn get_regime_parameters(
        &self,
        assessment_year: i32,
        regime: Regime,
    ) -> Result<RegimeParameters, RepositoryError>;
    async fn list_assessment_years(&self) -> Result<Vec<i32>, RepositoryError>;

    // Tax slabs
    async fn get_tax_slabs(
        &self,
        assessment_year: i32,
        regime: Regime,
    ) -> Result<Vec<TaxSlab>, RepositoryError>;
    async fn insert_tax_slab(
        &self,
        slab: &TaxSlab,
    ) -> Result<(), RepositoryError>;
    async fn delete_tax_slabs(
        &self,
        assessment_year: i32,
        regime: Regime,
    ) -> Result<(), RepositoryError>;
    /// Swaps the whole schedule for `assessment_year`/`regime` atomically:
    /// either every slab is stored or the previous schedule is kept.
    /// Returns the number of slabs written.
    async fn replace_tax_slabs(
        &self,
        assessment_year: i32,
        regime: Regime,
        slabs: &[TaxSlab],
    ) -> Result<usize, RepositoryError>;

    // Profiles
    async fn create_profile(
        &self,
        profile: NewUserProfile,
    ) -> Result<UserProfile, RepositoryError>;
    async fn get_profile(
        &self,
        id: i64,
    ) -> Result<UserProfile, RepositoryError>;
    async fn update_profile(
        &self,
        profile: &UserProfile,
    ) -> Result<(), RepositoryError>;
    async fn list_profiles(&self) -> Result<Vec<UserProfile>, RepositoryError>;

    // Deduction line items
    async fn add_deduction(
        &self,
        item: NewDeductionItem,
    ) -> Result<DeductionItem, RepositoryError>;
    async fn list_deductions(
        &self,
        profile_id: i64,
        assessment_year: i32,
    ) -> Result<Vec<DeductionItem>, RepositoryError>;
    async fn delete_deduction(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    // Income history
    async fn save_computation(
        &self,
        computation: NewSavedComputation,
    ) -> Result<SavedComputation, RepositoryError>;
    async fn get_computation(
        &self,
        id: i64,
    ) -> Result<SavedComputation, RepositoryError>;
    async fn list_computations(
        &self,
        profile_id: Option<i64>,
        assessment_year: Option<i32>,
    ) -> Result<Vec<SavedComputation>, RepositoryError>;
    async fn delete_computation(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    // Calendar
    async fn create_deadline(
        &self,
        deadline: NewTaxDeadline,
    ) -> Result<TaxDeadline, RepositoryError>;
    async fn list_deadlines(
        &self,
        assessment_year: i32,
        pending_only: bool,
    ) -> Result<Vec<TaxDeadline>, RepositoryError>;
    async fn set_deadline_completed(
        &self,
        id: i64,
        completed: bool,
    ) -> Result<(), RepositoryError>;
}
