//! Integration tests for the discovery engine

use galen_catalog::OntologyCatalog;
use galen_discovery::{DiscoveryConfig, RelationshipDiscoveryEngine, Vocabulary};
use galen_domain::{ClinicalValidity, DocumentMetadata};
use galen_store::DocumentStore;
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

const METFORMIN: &str = "Metformin is commonly used to treat type 2 diabetes mellitus.";

fn engine() -> RelationshipDiscoveryEngine {
    RelationshipDiscoveryEngine::new(
        Arc::new(Vocabulary::clinical().unwrap()),
        Arc::new(OntologyCatalog::with_seed().unwrap()),
        DiscoveryConfig::default(),
    )
    .unwrap()
}

#[test]
fn test_metformin_treats_diabetes() {
    let engine = engine();
    let found = engine.discover(METFORMIN, "ada_2024");

    assert_eq!(found.len(), 1);
    let candidate = &found[0];
    assert_eq!(candidate.source_entity, "Metformin");
    assert!(candidate.target_entity.contains("diabetes"));
    assert_eq!(candidate.relationship_class, "treatment");
    assert!(candidate.confidence_score >= 0.6);
    assert!(matches!(
        candidate.clinical_validity,
        ClinicalValidity::Probable | ClinicalValidity::Established
    ));
    assert_eq!(candidate.best_similar_type(), Some("treats"));
    assert_eq!(candidate.evidence_text, METFORMIN);
}

#[test]
fn test_empty_text_has_no_side_effects() {
    let engine = engine();
    assert!(engine.discover("", "empty_source").is_empty());
    assert!(engine.candidates().is_empty());

    let found = engine.discover(METFORMIN, "ada_2024");
    assert_eq!(found[0].id, "candidate_1");
}

#[test]
fn test_discover_is_not_idempotent() {
    let engine = engine();
    let first = engine.discover(METFORMIN, "a");
    let second = engine.discover(METFORMIN, "a");
    assert_eq!(first[0].id, "candidate_1");
    assert_eq!(second[0].id, "candidate_2");
    assert_eq!(engine.candidates().len(), 2);
}

#[test]
fn test_concurrent_calls_get_contiguous_ids() {
    let engine = Arc::new(engine());
    let text = "Metformin is used to treat diabetes. Lisinopril is used to treat hypertension.";

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.discover(text, &format!("source_{}", i)))
        })
        .collect();

    let mut all_ids = Vec::new();
    for handle in handles {
        let batch = handle.join().unwrap();
        let numbers: Vec<u64> = batch.iter().map(|c| c.sequence_number().unwrap()).collect();
        assert!(!numbers.is_empty());
        for window in numbers.windows(2) {
            assert_eq!(window[1], window[0] + 1);
        }
        all_ids.extend(numbers);
    }

    all_ids.sort_unstable();
    let expected: Vec<u64> = (1..=all_ids.len() as u64).collect();
    assert_eq!(all_ids, expected);
}

#[test]
fn test_export_import_round_trip() {
    let source = engine();
    source.discover(METFORMIN, "ada");
    source.discover("Hypertension is managed with diuretics.", "nice");
    source.mark_reviewed("candidate_2", true).unwrap();

    let json = source.export_candidates().unwrap();
    let exported: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(exported[0]["clinical_validity"], "probable");
    assert!(exported[0]["similar_existing_types"][0][1].is_f64());

    let target = engine();
    assert_eq!(target.import_candidates(&json).unwrap(), 2);
    assert_eq!(target.candidates(), source.candidates());
    assert_eq!(target.import_candidates(&json).unwrap(), 0);

    let next = target.discover(METFORMIN, "ada");
    assert_eq!(next[0].id, "candidate_3");
}

#[test]
fn test_discover_document_by_section() {
    let store = DocumentStore::in_memory();
    let doc = store
        .load(
            "ada.md",
            "# Pharmacological therapy\n\
             Metformin is commonly used to treat type 2 diabetes mellitus.\n\
             # Screening\n\
             HbA1c is used to diagnose type 2 diabetes.\n\
             # Notes\n\
             Nothing clinical here.\n",
            DocumentMetadata::new("ADA", "2024"),
        )
        .unwrap();

    let engine = engine();
    let report = engine.discover_document(&store, &doc.id).unwrap();

    assert!(report.failures.is_empty());
    assert_eq!(report.candidates.len(), 2);
    assert_eq!(report.candidates[0].relationship_class, "treatment");
    assert_eq!(report.candidates[0].evidence_sources, vec![format!("{}#s1", doc.id)]);
    assert_eq!(report.candidates[1].relationship_class, "diagnosis");
    assert_eq!(report.candidates[1].source_entity, "HbA1c");
    assert_eq!(report.candidates[1].evidence_sources, vec![format!("{}#s2", doc.id)]);
    assert_eq!(report.candidates[1].id, "candidate_2");
}

#[test]
fn test_discover_document_unknown_document() {
    let store = DocumentStore::in_memory();
    assert!(engine().discover_document(&store, "doc_missing").is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_candidates_are_surfaced_and_bounded(
        words in prop::collection::vec(
            prop::sample::select(vec![
                "metformin", "diabetes", "treat", "causes", "hypertension", "smoking",
                "meta-analysis", "patients", "HbA1c", "diagnose", "the", "and", "≥",
            ]),
            0..40,
        )
    ) {
        let engine = engine();
        let text = words.join(" ");
        for candidate in engine.discover(&text, "prop") {
            prop_assert!(candidate.confidence_score >= 0.3);
            prop_assert!(candidate.confidence_score <= 1.0);
            prop_assert_eq!(
                candidate.clinical_validity,
                ClinicalValidity::from_confidence(candidate.confidence_score)
            );
            prop_assert!(candidate.clinical_validity.is_surfaced());
        }
    }
}
