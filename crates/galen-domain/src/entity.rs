//! Clinical entity types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type classification of a clinical entity
///
/// Used as the domain and range of relationship definitions and as the
/// vocabulary keys for mention extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A drug or drug class used as therapy
    Medication,
    /// A disease, disorder, or clinical state
    Condition,
    /// A therapeutic or surgical intervention
    Procedure,
    /// A diagnostic test or measurement
    Test,
    /// A symptom or clinical sign
    Symptom,
    /// An organ or body structure
    Anatomy,
    /// A modifiable or fixed risk factor
    RiskFactor,
    /// A pharmacological class
    DrugClass,
    /// A point-in-time clinical event
    Event,
    /// Could not be classified
    Unknown,
}

impl EntityType {
    /// Every entity type, in declaration order
    pub const ALL: [EntityType; 10] = [
        EntityType::Medication,
        EntityType::Condition,
        EntityType::Procedure,
        EntityType::Test,
        EntityType::Symptom,
        EntityType::Anatomy,
        EntityType::RiskFactor,
        EntityType::DrugClass,
        EntityType::Event,
        EntityType::Unknown,
    ];

    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Medication => "medication",
            EntityType::Condition => "condition",
            EntityType::Procedure => "procedure",
            EntityType::Test => "test",
            EntityType::Symptom => "symptom",
            EntityType::Anatomy => "anatomy",
            EntityType::RiskFactor => "risk_factor",
            EntityType::DrugClass => "drug_class",
            EntityType::Event => "event",
            EntityType::Unknown => "unknown",
        }
    }

    /// Parse an entity type from a string
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(|c: char| c == ' ' || c == '-', "_");
        Self::ALL.into_iter().find(|t| t.as_str() == normalized)
    }

    /// Whether this entity acts on a condition (drugs, procedures, tests)
    ///
    /// Interventions are placed on the source side of treatment, prevention,
    /// and diagnosis relationships regardless of sentence order.
    pub fn is_intervention(&self) -> bool {
        matches!(
            self,
            EntityType::Medication
                | EntityType::Procedure
                | EntityType::Test
                | EntityType::DrugClass
        )
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid entity type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        assert_eq!(EntityType::parse("Medication"), Some(EntityType::Medication));
        assert_eq!(EntityType::parse("risk factor"), Some(EntityType::RiskFactor));
        assert_eq!(EntityType::parse("drug-class"), Some(EntityType::DrugClass));
        assert_eq!(EntityType::parse("gene"), None);
    }

    #[test]
    fn test_interventions() {
        assert!(EntityType::Medication.is_intervention());
        assert!(EntityType::Test.is_intervention());
        assert!(!EntityType::Condition.is_intervention());
        assert!(!EntityType::Symptom.is_intervention());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&EntityType::RiskFactor).unwrap();
        assert_eq!(json, "\"risk_factor\"");
        let parsed: EntityType = serde_json::from_str("\"drug_class\"").unwrap();
        assert_eq!(parsed, EntityType::DrugClass);
    }
}
