//! The relationship discovery engine

use crate::{
    Assessment, ContextAnalyzer, DiscoveryConfig, DiscoveryError, EntityPair,
    EntityPairExtractor, Vocabulary,
};
use galen_catalog::OntologyCatalog;
use galen_domain::{current_timestamp, RelationshipCandidate};
use galen_store::DocumentStore;
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A section that could not be processed during document discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionFailure {
    /// Section id
    pub section_id: String,
    /// Error message
    pub error: String,
}

/// Outcome of discovering over every section of a document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentDiscoveryReport {
    /// Document id
    pub document_id: String,
    /// Candidates produced, in section order
    pub candidates: Vec<RelationshipCandidate>,
    /// Sections that failed; the others were still processed
    pub failures: Vec<SectionFailure>,
}

#[derive(Default)]
struct EngineState {
    next_id: u64,
    discovered: Vec<RelationshipCandidate>,
}

impl EngineState {
    /// Number and append a batch under one lock so its ids are contiguous
    fn commit(&mut self, batch: Vec<RelationshipCandidate>) -> Vec<RelationshipCandidate> {
        let mut committed = Vec::with_capacity(batch.len());
        for mut candidate in batch {
            self.next_id += 1;
            candidate.id = format!("candidate_{}", self.next_id);
            self.discovered.push(candidate.clone());
            committed.push(candidate);
        }
        committed
    }
}

/// Mines scored relationship candidates from text
///
/// Extraction and scoring run without holding any lock; only id assignment
/// and the append to the discovered list are serialised, so concurrent
/// `discover` calls each receive a contiguous block of ids.
///
/// # Examples
///
/// ```
/// use galen_catalog::OntologyCatalog;
/// use galen_discovery::{DiscoveryConfig, RelationshipDiscoveryEngine, Vocabulary};
/// use std::sync::Arc;
///
/// let engine = RelationshipDiscoveryEngine::new(
///     Arc::new(Vocabulary::clinical().unwrap()),
///     Arc::new(OntologyCatalog::with_seed().unwrap()),
///     DiscoveryConfig::default(),
/// )
/// .unwrap();
///
/// let found = engine.discover("Metformin is commonly used to treat type 2 diabetes mellitus.", "ada");
/// assert_eq!(found[0].id, "candidate_1");
/// assert_eq!(found[0].relationship_class, "treatment");
/// ```
pub struct RelationshipDiscoveryEngine {
    extractor: EntityPairExtractor,
    analyzer: ContextAnalyzer,
    catalog: Arc<OntologyCatalog>,
    config: DiscoveryConfig,
    state: Mutex<EngineState>,
}

impl RelationshipDiscoveryEngine {
    /// Create an engine over a vocabulary and catalog
    pub fn new(
        vocabulary: Arc<Vocabulary>,
        catalog: Arc<OntologyCatalog>,
        config: DiscoveryConfig,
    ) -> Result<Self, DiscoveryError> {
        config.validate().map_err(DiscoveryError::Config)?;

        Ok(Self {
            extractor: EntityPairExtractor::new(Arc::clone(&vocabulary), config.clone()),
            analyzer: ContextAnalyzer::new(vocabulary),
            catalog,
            config,
            state: Mutex::new(EngineState::default()),
        })
    }

    /// The configuration in use
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Discover candidates in `text`
    ///
    /// Each call appends its candidates with fresh ids; calling twice on the
    /// same text yields two sets of candidates.
    pub fn discover(&self, text: &str, source_id: &str) -> Vec<RelationshipCandidate> {
        let batch = self.score_text(text, source_id);
        if batch.is_empty() {
            debug!(source_id, "No candidates discovered");
            return Vec::new();
        }

        let committed = self.state.lock().commit(batch);
        info!(source_id, count = committed.len(), "Discovered relationship candidates");
        committed
    }

    /// Discover candidates in every section of a stored document
    ///
    /// Sections are scanned in parallel. A section whose content cannot be
    /// read is recorded in the report; the others still contribute.
    pub fn discover_document(
        &self,
        store: &DocumentStore,
        document_id: &str,
    ) -> Result<DocumentDiscoveryReport, DiscoveryError> {
        let document = store.get_document(document_id)?;

        let results: Vec<(String, Result<Vec<RelationshipCandidate>, String>)> = document
            .sections
            .par_iter()
            .map(|section| {
                let outcome = store
                    .get_content(document_id, Some(&section.id))
                    .map(|content| {
                        let source = format!("{}#{}", document_id, section.id);
                        self.score_text(&content, &source)
                    })
                    .map_err(|e| e.to_string());
                (section.id.clone(), outcome)
            })
            .collect();

        let (batch, failures) = partition_outcomes(document_id, results);
        let candidates = self.state.lock().commit(batch);
        info!(
            document_id,
            sections = document.sections.len(),
            candidates = candidates.len(),
            failures = failures.len(),
            "Discovered candidates in document"
        );

        Ok(DocumentDiscoveryReport {
            document_id: document_id.to_string(),
            candidates,
            failures,
        })
    }

    /// Extract and score without touching engine state
    fn score_text(&self, text: &str, source_id: &str) -> Vec<RelationshipCandidate> {
        self.extractor
            .extract_pairs(text)
            .into_iter()
            .filter_map(|pair| {
                let assessment = self.analyzer.assess(&pair);
                if assessment.confidence < self.config.min_confidence {
                    debug!(
                        source = %pair.source.text,
                        target = %pair.target.text,
                        confidence = assessment.confidence,
                        "Dropped low-confidence pair"
                    );
                    return None;
                }
                Some(self.candidate(pair, assessment, source_id))
            })
            .collect()
    }

    fn candidate(
        &self,
        pair: EntityPair,
        assessment: Assessment,
        source_id: &str,
    ) -> RelationshipCandidate {
        let class = self.extractor.vocabulary().class(&pair.relationship_class);

        let similar_existing_types = class
            .map(|c| {
                c.similar_types
                    .iter()
                    .filter(|t| self.catalog.contains(t))
                    .map(|t| (t.clone(), self.config.similarity_weight))
                    .collect()
            })
            .unwrap_or_default();

        RelationshipCandidate {
            id: String::new(),
            source_entity: pair.source.text,
            target_entity: pair.target.text,
            source_type: pair.source.entity_type,
            target_type: pair.target.entity_type,
            relationship_class: pair.relationship_class,
            confidence_score: assessment.confidence,
            clinical_validity: assessment.validity,
            similar_existing_types,
            evidence_sources: vec![source_id.to_string()],
            evidence_text: pair.context,
            property_schema: class.map(|c| c.property_schema.clone()).unwrap_or_default(),
            discovered_at: current_timestamp(),
            reviewed: false,
            approved: false,
        }
    }

    /// All candidates discovered so far, in id order
    pub fn candidates(&self) -> Vec<RelationshipCandidate> {
        self.state.lock().discovered.clone()
    }

    /// Look up a candidate by id
    pub fn get(&self, candidate_id: &str) -> Option<RelationshipCandidate> {
        self.state
            .lock()
            .discovered
            .iter()
            .find(|c| c.id == candidate_id)
            .cloned()
    }

    /// Record a review decision on a candidate
    pub fn mark_reviewed(
        &self,
        candidate_id: &str,
        approved: bool,
    ) -> Result<RelationshipCandidate, DiscoveryError> {
        let mut state = self.state.lock();
        let candidate = state
            .discovered
            .iter_mut()
            .find(|c| c.id == candidate_id)
            .ok_or_else(|| DiscoveryError::CandidateNotFound(candidate_id.to_string()))?;
        candidate.reviewed = true;
        candidate.approved = approved;
        debug!(candidate_id, approved, "Candidate reviewed");
        Ok(candidate.clone())
    }

    /// Export every candidate as a JSON array
    pub fn export_candidates(&self) -> Result<String, DiscoveryError> {
        Ok(serde_json::to_string_pretty(&self.state.lock().discovered)?)
    }

    /// Import candidates from a JSON array, returning how many were added
    ///
    /// Candidates whose id already exists are skipped. The id counter moves
    /// past the highest imported sequence number.
    pub fn import_candidates(&self, json: &str) -> Result<usize, DiscoveryError> {
        let incoming: Vec<RelationshipCandidate> = serde_json::from_str(json)?;

        let mut state = self.state.lock();
        let mut added = 0;
        for candidate in incoming {
            if state.discovered.iter().any(|c| c.id == candidate.id) {
                continue;
            }
            if let Some(n) = candidate.sequence_number() {
                state.next_id = state.next_id.max(n);
            }
            state.discovered.push(candidate);
            added += 1;
        }
        state
            .discovered
            .sort_by_key(|c| c.sequence_number().unwrap_or(u64::MAX));

        info!(added, total = state.discovered.len(), "Imported candidates");
        Ok(added)
    }
}

/// Split per-section outcomes into the successful candidates and failures
fn partition_outcomes(
    document_id: &str,
    results: Vec<(String, Result<Vec<RelationshipCandidate>, String>)>,
) -> (Vec<RelationshipCandidate>, Vec<SectionFailure>) {
    let mut batch = Vec::new();
    let mut failures = Vec::new();
    for (section_id, outcome) in results {
        match outcome {
            Ok(candidates) => batch.extend(candidates),
            Err(error) => {
                warn!(document_id, section_id = %section_id, error = %error, "Section discovery failed");
                failures.push(SectionFailure { section_id, error });
            }
        }
    }
    (batch, failures)
}
