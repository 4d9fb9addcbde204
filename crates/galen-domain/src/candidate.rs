//! Relationship candidates mined from text

use crate::{ClinicalValidity, EntityType, PropertySchema};
use serde::{Deserialize, Serialize};

/// An unapproved, scored hypothesis that two clinical entities are related
///
/// Candidates are ephemeral: they live in a discovery engine until a caller
/// curates them into proposals. Field names are the export contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipCandidate {
    /// Engine-scoped sequential id (`candidate_<n>`)
    pub id: String,

    /// Source entity text as it appeared in the document
    pub source_entity: String,

    /// Target entity text as it appeared in the document
    pub target_entity: String,

    /// Vocabulary type of the source mention
    pub source_type: EntityType,

    /// Vocabulary type of the target mention
    pub target_type: EntityType,

    /// Free-text relationship class (e.g. "treatment", "causation")
    pub relationship_class: String,

    /// Weighted confidence in [0.3, 1.0]
    pub confidence_score: f64,

    /// Tier derived from `confidence_score`
    pub clinical_validity: ClinicalValidity,

    /// Ranked `(catalog type id, similarity)` pairs
    #[serde(default)]
    pub similar_existing_types: Vec<(String, f64)>,

    /// Where the evidence came from (source ids)
    #[serde(default)]
    pub evidence_sources: Vec<String>,

    /// Context window the candidate was mined from
    #[serde(default)]
    pub evidence_text: String,

    /// Property schema suggested for the relationship class
    #[serde(default)]
    pub property_schema: PropertySchema,

    /// When the candidate was discovered (seconds since epoch)
    pub discovered_at: u64,

    /// Whether a reviewer has looked at it
    #[serde(default)]
    pub reviewed: bool,

    /// Whether a reviewer accepted it
    #[serde(default)]
    pub approved: bool,
}

impl RelationshipCandidate {
    /// Numeric part of a `candidate_<n>` id
    pub fn sequence_number(&self) -> Option<u64> {
        self.id.strip_prefix("candidate_")?.parse().ok()
    }

    /// Highest-ranked similar catalog type, if any
    pub fn best_similar_type(&self) -> Option<&str> {
        self.similar_existing_types.first().map(|(t, _)| t.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RelationshipCandidate {
        RelationshipCandidate {
            id: "candidate_7".to_string(),
            source_entity: "Metformin".to_string(),
            target_entity: "type 2 diabetes mellitus".to_string(),
            source_type: EntityType::Medication,
            target_type: EntityType::Condition,
            relationship_class: "treatment".to_string(),
            confidence_score: 0.66,
            clinical_validity: ClinicalValidity::Probable,
            similar_existing_types: vec![("treats".to_string(), 0.8)],
            evidence_sources: vec!["ada_2024".to_string()],
            evidence_text: "Metformin is commonly used to treat type 2 diabetes mellitus.".to_string(),
            property_schema: PropertySchema::new(),
            discovered_at: 1_700_000_000,
            reviewed: false,
            approved: false,
        }
    }

    #[test]
    fn test_sequence_number() {
        assert_eq!(sample().sequence_number(), Some(7));
    }

    #[test]
    fn test_export_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json["confidence_score"].is_f64());
        assert_eq!(json["clinical_validity"], "probable");
        assert_eq!(json["similar_existing_types"][0][0], "treats");
        assert_eq!(json["similar_existing_types"][0][1], 0.8);
    }
}
