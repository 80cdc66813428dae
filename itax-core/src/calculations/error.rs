use thiserror::Error;

use crate::models::{Regime, RegimeParametersError};

/// Errors returned by the liability engine and its helpers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LiabilityError {
    /// An income or deduction amount is negative or not a finite number.
    /// `field` names the offending input so callers can flag it.
    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// The parameter set for a regime cannot be used.
    #[error("invalid {regime} regime parameters: {source}")]
    InvalidParameters {
        regime: Regime,
        #[source]
        source: RegimeParametersError,
    },
}

impl LiabilityError {
    pub(crate) fn invalid_input(
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
