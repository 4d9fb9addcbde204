//! Confidence scoring for extracted pairs

use crate::{EntityPair, Vocabulary};
use galen_domain::{ClinicalValidity, EntityType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Weight of the evidence-strength component
pub const EVIDENCE_WEIGHT: f64 = 0.3;

/// Weight of the clinical-relevance component
pub const RELEVANCE_WEIGHT: f64 = 0.3;

/// Weight of the type-pairing consistency component
pub const CONSISTENCY_WEIGHT: f64 = 0.4;

/// Component scores and the blended confidence for one pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Evidence strength from phrase tiers
    pub evidence: f64,
    /// Clinical relevance from keyword density
    pub relevance: f64,
    /// Type-pairing consistency for the relationship class
    pub consistency: f64,
    /// Weighted blend of the three components
    pub confidence: f64,
    /// Tier derived from `confidence`
    pub validity: ClinicalValidity,
}

/// Scores seed pairs against the vocabulary tables
///
/// Pure: the same context and types always produce the same assessment.
#[derive(Debug, Clone)]
pub struct ContextAnalyzer {
    vocabulary: Arc<Vocabulary>,
}

impl ContextAnalyzer {
    /// Create an analyzer over a vocabulary
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    /// Assess an extracted pair
    pub fn assess(&self, pair: &EntityPair) -> Assessment {
        self.score(
            &pair.relationship_class,
            pair.source.entity_type,
            pair.target.entity_type,
            &pair.context,
        )
    }

    /// Score a class and type pairing in a given context
    pub fn score(
        &self,
        class: &str,
        source_type: EntityType,
        target_type: EntityType,
        context: &str,
    ) -> Assessment {
        let evidence = self.evidence_strength(context);
        let relevance = self.clinical_relevance(context);
        let consistency = self.vocabulary.consistency(class, source_type, target_type);

        let confidence = (EVIDENCE_WEIGHT * evidence
            + RELEVANCE_WEIGHT * relevance
            + CONSISTENCY_WEIGHT * consistency)
            .clamp(0.0, 1.0);

        Assessment {
            evidence,
            relevance,
            consistency,
            confidence,
            validity: ClinicalValidity::from_confidence(confidence),
        }
    }

    /// Score of the first evidence tier with a phrase in `context`
    pub fn evidence_strength(&self, context: &str) -> f64 {
        self.vocabulary
            .evidence_tiers()
            .iter()
            .find(|tier| tier.matches(context))
            .map_or(self.vocabulary.default_evidence(), |tier| tier.score)
    }

    /// `min(0.9, 0.3 + 0.1 × distinct clinical keywords)`
    pub fn clinical_relevance(&self, context: &str) -> f64 {
        let keywords = self.vocabulary.count_clinical_keywords(context);
        (0.3 + 0.1 * keywords as f64).min(0.9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn analyzer() -> ContextAnalyzer {
        ContextAnalyzer::new(Arc::new(Vocabulary::clinical().unwrap()))
    }

    #[test]
    fn test_metformin_sentence_is_probable() {
        let assessment = analyzer().score(
            "treatment",
            EntityType::Medication,
            EntityType::Condition,
            "Metformin is commonly used to treat type 2 diabetes mellitus.",
        );
        assert_eq!(assessment.evidence, 0.5);
        assert!((assessment.relevance - 0.5).abs() < 1e-9);
        assert_eq!(assessment.consistency, 0.9);
        assert!((assessment.confidence - 0.66).abs() < 1e-9);
        assert_eq!(assessment.validity, ClinicalValidity::Probable);
    }

    #[test]
    fn test_evidence_tiers_in_order() {
        let analyzer = analyzer();
        assert_eq!(
            analyzer.evidence_strength("A meta-analysis and a case report agree."),
            0.9
        );
        assert_eq!(analyzer.evidence_strength("One cohort study found this."), 0.7);
        assert_eq!(analyzer.evidence_strength("Based on expert opinion."), 0.3);
        assert_eq!(analyzer.evidence_strength("No qualifier."), 0.5);
    }

    #[test]
    fn test_relevance_caps_at_point_nine() {
        let context = "treat treatment therapy diagnosis patient dose risk mortality \
                       efficacy outcome guideline clinical";
        assert_eq!(analyzer().clinical_relevance(context), 0.9);
        assert_eq!(analyzer().clinical_relevance("nothing here"), 0.3);
    }

    #[test]
    fn test_strong_evidence_reaches_established() {
        let assessment = analyzer().score(
            "treatment",
            EntityType::Medication,
            EntityType::Condition,
            "Randomised controlled trials show metformin is recommended to treat diabetes \
             and lowers cardiovascular mortality in patients.",
        );
        assert_eq!(assessment.evidence, 0.9);
        assert_eq!(assessment.validity, ClinicalValidity::Established);
    }

    proptest! {
        #[test]
        fn prop_confidence_is_bounded_and_tier_is_pure(context in ".{0,300}") {
            let analyzer = analyzer();
            for &(source, target) in &[
                (EntityType::Medication, EntityType::Condition),
                (EntityType::Symptom, EntityType::Anatomy),
            ] {
                let a = analyzer.score("treatment", source, target, &context);
                prop_assert!(a.confidence >= 0.3 && a.confidence <= 1.0);
                prop_assert_eq!(a.validity, ClinicalValidity::from_confidence(a.confidence));
                prop_assert_eq!(a, analyzer.score("treatment", source, target, &context));
            }
        }
    }
}
