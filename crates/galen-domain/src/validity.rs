//! Validity tiers for relationship candidates

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum confidence for the `established` tier
pub const ESTABLISHED_THRESHOLD: f64 = 0.8;

/// Minimum confidence for the `probable` tier
pub const PROBABLE_THRESHOLD: f64 = 0.6;

/// Minimum confidence for the `questionable` tier; anything lower is never surfaced
pub const QUESTIONABLE_THRESHOLD: f64 = 0.3;

/// Clinical validity of a candidate relationship
///
/// Tiers are a pure function of the confidence score:
/// - Established: confidence ≥ 0.8
/// - Probable: confidence ≥ 0.6
/// - Questionable: confidence ≥ 0.3
/// - Invalid: below 0.3 (discarded before it leaves the analyzer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClinicalValidity {
    /// Too weak to surface
    Invalid,

    /// Plausible but thinly supported
    Questionable,

    /// Likely, with reasonable support
    Probable,

    /// Well supported
    Established,
}

impl ClinicalValidity {
    /// Derive the tier for a confidence score
    ///
    /// # Examples
    ///
    /// ```
    /// use galen_domain::ClinicalValidity;
    ///
    /// assert_eq!(ClinicalValidity::from_confidence(0.85), ClinicalValidity::Established);
    /// assert_eq!(ClinicalValidity::from_confidence(0.6), ClinicalValidity::Probable);
    /// assert_eq!(ClinicalValidity::from_confidence(0.1), ClinicalValidity::Invalid);
    /// ```
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= ESTABLISHED_THRESHOLD {
            ClinicalValidity::Established
        } else if confidence >= PROBABLE_THRESHOLD {
            ClinicalValidity::Probable
        } else if confidence >= QUESTIONABLE_THRESHOLD {
            ClinicalValidity::Questionable
        } else {
            ClinicalValidity::Invalid
        }
    }

    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ClinicalValidity::Invalid => "invalid",
            ClinicalValidity::Questionable => "questionable",
            ClinicalValidity::Probable => "probable",
            ClinicalValidity::Established => "established",
        }
    }

    /// Parse a tier from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "invalid" => Some(ClinicalValidity::Invalid),
            "questionable" => Some(ClinicalValidity::Questionable),
            "probable" => Some(ClinicalValidity::Probable),
            "established" => Some(ClinicalValidity::Established),
            _ => None,
        }
    }

    /// Whether a candidate in this tier may leave the analyzer
    pub fn is_surfaced(&self) -> bool {
        *self != ClinicalValidity::Invalid
    }
}

impl fmt::Display for ClinicalValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ClinicalValidity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid clinical validity: {}", s))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: tiers are monotone in confidence
        #[test]
        fn test_tier_monotone(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ClinicalValidity::from_confidence(lo) <= ClinicalValidity::from_confidence(hi));
        }

        /// Property: anything at or above the surfacing floor is surfaced
        #[test]
        fn test_surfaced_iff_above_floor(c in 0.0f64..=1.0) {
            let surfaced = ClinicalValidity::from_confidence(c).is_surfaced();
            prop_assert_eq!(surfaced, c >= QUESTIONABLE_THRESHOLD);
        }
    }
}
