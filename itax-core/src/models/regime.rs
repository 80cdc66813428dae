use std::fmt;

use serde::{Deserialize, Serialize};

/// The two mutually exclusive statutory computation schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Old,
    New,
}

impl Regime {
    pub const ALL: [Regime; 2] = [Regime::Old, Regime::New];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::New => "new",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "old" => Some(Self::Old),
            "new" => Some(Self::New),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Old => "Old regime",
            Self::New => "New regime",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_accepts_mixed_case_and_whitespace() {
        assert_eq!(Regime::parse("old"), Some(Regime::Old));
        assert_eq!(Regime::parse(" NEW "), Some(Regime::New));
    }

    #[test]
    fn parse_rejects_unknown_codes() {
        assert_eq!(Regime::parse("legacy"), None);
        assert_eq!(Regime::parse(""), None);
    }

    #[test]
    fn as_str_round_trips_through_parse() {
        for regime in Regime::ALL {
            assert_eq!(Regime::parse(regime.as_str()), Some(regime));
        }
    }
}
