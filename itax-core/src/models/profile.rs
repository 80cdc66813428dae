use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Regime;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile name must not be empty")]
    EmptyName,

    #[error("'{0}' is not a valid PAN (expected five letters, four digits, one letter)")]
    InvalidPan(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub pan: Option<String>,
    pub preferred_regime: Option<Regime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new profiles (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserProfile {
    pub name: String,
    pub pan: Option<String>,
    pub preferred_regime: Option<Regime>,
}

impl NewUserProfile {
    /// Trims the name, upper-cases the PAN and checks both.
    pub fn normalized(self) -> Result<Self, ProfileError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }
        let pan = self.pan.map(|p| normalize_pan(&p)).transpose()?;
        Ok(Self {
            name,
            pan,
            preferred_regime: self.preferred_regime,
        })
    }
}

fn pan_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("static PAN pattern"))
}

/// Upper-cases and validates a Permanent Account Number.
pub fn normalize_pan(raw: &str) -> Result<String, ProfileError> {
    let pan = raw.trim().to_ascii_uppercase();
    if pan_pattern().is_match(&pan) {
        Ok(pan)
    } else {
        Err(ProfileError::InvalidPan(raw.to_string()))
    }
}
