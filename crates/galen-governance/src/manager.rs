//! Proposal lifecycle: generate, review, activate

use crate::{GovernanceConfig, ProposalError};
use galen_catalog::OntologyCatalog;
use galen_discovery::{render_template, Vocabulary};
use galen_domain::{
    current_timestamp, DefinitionOrigin, ProposalStatus, RelationshipCandidate,
    RelationshipCategory, RelationshipDefinition, RelationshipProposal, ValidationRule,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of an activation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationOutcome {
    /// The proposal was registered as a new catalog type
    Activated,
    /// The catalog already holds the type registered from this proposal
    AlreadyActive,
}

#[derive(Default)]
struct Registry {
    proposals: BTreeMap<String, RelationshipProposal>,
    by_candidate: HashMap<String, String>,
}

impl Registry {
    fn insert(&mut self, proposal: RelationshipProposal) {
        self.by_candidate
            .insert(proposal.candidate_id.clone(), proposal.id.clone());
        self.proposals.insert(proposal.id.clone(), proposal);
    }

    fn get_mut(&mut self, proposal_id: &str) -> Result<&mut RelationshipProposal, ProposalError> {
        self.proposals
            .get_mut(proposal_id)
            .ok_or_else(|| ProposalError::ProposalNotFound(proposal_id.to_string()))
    }
}

/// Turns candidates into reviewable proposals
///
/// Approval never touches the catalog. Only [`ProposalManager::activate`]
/// registers a definition, and only for an approved proposal. Rejected
/// proposals stay archived under their candidate id, which blocks that
/// candidate from being proposed again.
///
/// # Examples
///
/// ```
/// use galen_catalog::OntologyCatalog;
/// use galen_discovery::{DiscoveryConfig, RelationshipDiscoveryEngine, Vocabulary};
/// use galen_governance::{ActivationOutcome, GovernanceConfig, ProposalManager};
/// use std::sync::Arc;
///
/// let vocabulary = Arc::new(Vocabulary::clinical().unwrap());
/// let catalog = Arc::new(OntologyCatalog::new());
/// let engine = RelationshipDiscoveryEngine::new(
///     Arc::clone(&vocabulary),
///     Arc::clone(&catalog),
///     DiscoveryConfig::default(),
/// )
/// .unwrap();
/// let manager = ProposalManager::new(vocabulary, GovernanceConfig::default()).unwrap();
///
/// let candidate = &engine.discover("Metformin is used to treat diabetes.", "ada")[0];
/// let proposal = manager.generate_proposal(candidate).unwrap();
/// assert!(manager.approve(&proposal.id, "dr.lee").unwrap());
/// assert!(catalog.is_empty());
///
/// assert_eq!(manager.activate(&proposal.id, &catalog).unwrap(), ActivationOutcome::Activated);
/// assert!(catalog.contains("medication_treats_condition"));
/// ```
pub struct ProposalManager {
    vocabulary: Arc<Vocabulary>,
    config: GovernanceConfig,
    registry: RwLock<Registry>,
}

impl ProposalManager {
    /// Create a manager
    pub fn new(vocabulary: Arc<Vocabulary>, config: GovernanceConfig) -> Result<Self, ProposalError> {
        config.validate().map_err(ProposalError::Config)?;
        Ok(Self {
            vocabulary,
            config,
            registry: RwLock::new(Registry::default()),
        })
    }

    /// Write up a candidate as a proposal
    ///
    /// A candidate that already has a live proposal gets that proposal back.
    ///
    /// # Errors
    ///
    /// `CandidateRejected` if the candidate's earlier proposal was rejected.
    pub fn generate_proposal(
        &self,
        candidate: &RelationshipCandidate,
    ) -> Result<RelationshipProposal, ProposalError> {
        let mut registry = self.registry.write();

        if let Some(existing) = registry
            .by_candidate
            .get(&candidate.id)
            .and_then(|id| registry.proposals.get(id))
        {
            if existing.status == ProposalStatus::Rejected {
                return Err(ProposalError::CandidateRejected(candidate.id.clone()));
            }
            debug!(candidate_id = %candidate.id, proposal_id = %existing.id, "Returning existing proposal");
            return Ok(existing.clone());
        }

        let proposal = self.draft(candidate);
        info!(
            proposal_id = %proposal.id,
            candidate_id = %candidate.id,
            proposed_name = %proposal.proposed_name,
            "Generated proposal"
        );
        registry.insert(proposal.clone());
        Ok(proposal)
    }

    fn draft(&self, candidate: &RelationshipCandidate) -> RelationshipProposal {
        let domain_type = self.vocabulary.classify(&candidate.source_entity);
        let range_type = self.vocabulary.classify(&candidate.target_entity);
        let class = self.vocabulary.class(&candidate.relationship_class);

        let render = |template: &str| {
            render_template(
                template,
                &candidate.relationship_class,
                &candidate.source_entity,
                &candidate.target_entity,
                domain_type,
                range_type,
            )
        };
        let (proposed_name, description) = match class {
            Some(class) => (render(&class.name_template), render(&class.description_template)),
            None => (
                render("{source_type}_{class}_{target_type}"),
                render("A {source_type} (e.g. {source}) is related by {class} to a {target_type} (e.g. {target})."),
            ),
        };

        let mut validation_rules = vec![
            ValidationRule::SourceType { expected: domain_type },
            ValidationRule::TargetType { expected: range_type },
        ];
        if self.config.require_evidence {
            validation_rules.push(ValidationRule::RequiresEvidence);
        }
        validation_rules.push(ValidationRule::MinConfidence {
            threshold: self.config.min_confidence,
        });

        let mut examples = vec![format!(
            "{} {} {}",
            candidate.source_entity, candidate.relationship_class, candidate.target_entity
        )];
        if !candidate.evidence_text.is_empty() {
            examples.push(candidate.evidence_text.clone());
        }
        examples.truncate(self.config.max_examples);

        RelationshipProposal {
            id: RelationshipProposal::new_id(),
            candidate_id: candidate.id.clone(),
            proposed_name,
            description,
            domain_type,
            range_type,
            property_schema: candidate.property_schema.clone(),
            validation_rules,
            examples,
            created_at: current_timestamp(),
            reviewed_by: None,
            approved: false,
            approved_at: None,
            status: ProposalStatus::Pending,
            rejection_reason: None,
        }
    }

    /// Approve a proposal
    ///
    /// Returns `false` when it was already approved. The catalog is not
    /// touched; see [`ProposalManager::activate`].
    pub fn approve(&self, proposal_id: &str, reviewer: &str) -> Result<bool, ProposalError> {
        let mut registry = self.registry.write();
        let proposal = registry.get_mut(proposal_id)?;

        match proposal.status {
            ProposalStatus::Approved | ProposalStatus::Activated => Ok(false),
            ProposalStatus::Rejected => Err(ProposalError::AlreadyDecided {
                proposal_id: proposal_id.to_string(),
                status: proposal.status.as_str().to_string(),
            }),
            ProposalStatus::Pending => {
                proposal.approved = true;
                proposal.approved_at = Some(current_timestamp());
                proposal.reviewed_by = Some(reviewer.to_string());
                proposal.status = ProposalStatus::Approved;
                info!(proposal_id, reviewer, "Approved proposal");
                Ok(true)
            }
        }
    }

    /// Reject a proposal and archive it under its candidate id
    pub fn reject(
        &self,
        proposal_id: &str,
        reviewer: &str,
        reason: &str,
    ) -> Result<RelationshipProposal, ProposalError> {
        let mut registry = self.registry.write();
        let proposal = registry.get_mut(proposal_id)?;

        match proposal.status {
            ProposalStatus::Rejected => Ok(proposal.clone()),
            ProposalStatus::Approved | ProposalStatus::Activated => {
                Err(ProposalError::AlreadyDecided {
                    proposal_id: proposal_id.to_string(),
                    status: proposal.status.as_str().to_string(),
                })
            }
            ProposalStatus::Pending => {
                proposal.status = ProposalStatus::Rejected;
                proposal.reviewed_by = Some(reviewer.to_string());
                proposal.rejection_reason = Some(reason.to_string());
                info!(proposal_id, reviewer, reason, "Rejected proposal");
                Ok(proposal.clone())
            }
        }
    }

    /// Register an approved proposal as a catalog definition
    ///
    /// Idempotent: activating again reports `AlreadyActive` as long as the
    /// catalog holds the definition this proposal registered.
    ///
    /// # Errors
    ///
    /// - `NotApproved` for pending or rejected proposals
    /// - `Catalog(DuplicateType)` if another definition owns the type id
    pub fn activate(
        &self,
        proposal_id: &str,
        catalog: &OntologyCatalog,
    ) -> Result<ActivationOutcome, ProposalError> {
        self.activate_as(proposal_id, None, catalog)
    }

    /// Activate under a reviewer-chosen type id
    ///
    /// Proposals named from the same class template share a type id, so only
    /// the first of them can take it. The override renames an approved
    /// proposal before registration; once active the name is fixed and an
    /// override is ignored.
    ///
    /// # Errors
    ///
    /// As [`activate`](Self::activate), plus `InvalidName` for an override
    /// that is not snake case.
    pub fn activate_as(
        &self,
        proposal_id: &str,
        type_id: Option<&str>,
        catalog: &OntologyCatalog,
    ) -> Result<ActivationOutcome, ProposalError> {
        let mut registry = self.registry.write();
        let proposal = registry.get_mut(proposal_id)?;

        if !matches!(
            proposal.status,
            ProposalStatus::Approved | ProposalStatus::Activated
        ) {
            return Err(ProposalError::NotApproved(proposal_id.to_string()));
        }

        let registered_here = catalog.get(&proposal.proposed_name).is_some_and(|definition| {
            matches!(&definition.origin, DefinitionOrigin::Proposal { proposal_id: id } if id == proposal_id)
        });
        if registered_here {
            proposal.status = ProposalStatus::Activated;
            debug!(proposal_id, "Proposal already active");
            return Ok(ActivationOutcome::AlreadyActive);
        }

        let mut definition = definition_from(proposal);
        if let Some(type_id) = type_id {
            if !is_snake_case(type_id) {
                return Err(ProposalError::InvalidName(type_id.to_string()));
            }
            definition.type_id = type_id.to_string();
            definition.name = type_id.replace('_', " ");
        }

        catalog.register(definition)?;
        if let Some(type_id) = type_id {
            proposal.proposed_name = type_id.to_string();
        }
        proposal.status = ProposalStatus::Activated;
        info!(proposal_id, type_id = %proposal.proposed_name, "Activated proposal");
        Ok(ActivationOutcome::Activated)
    }

    /// Look up a proposal
    pub fn get(&self, proposal_id: &str) -> Option<RelationshipProposal> {
        self.registry.read().proposals.get(proposal_id).cloned()
    }

    /// The proposal generated for a candidate, if any
    pub fn for_candidate(&self, candidate_id: &str) -> Option<RelationshipProposal> {
        let registry = self.registry.read();
        registry
            .by_candidate
            .get(candidate_id)
            .and_then(|id| registry.proposals.get(id))
            .cloned()
    }

    /// Proposals awaiting review, oldest first
    pub fn pending(&self) -> Vec<RelationshipProposal> {
        let mut pending: Vec<_> = self
            .registry
            .read()
            .proposals
            .values()
            .filter(|p| p.is_pending())
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        pending
    }

    /// Every proposal, in id order
    pub fn list(&self) -> Vec<RelationshipProposal> {
        self.registry.read().proposals.values().cloned().collect()
    }

    /// Export every proposal as a JSON array
    pub fn export_proposals(&self) -> Result<String, ProposalError> {
        Ok(serde_json::to_string_pretty(&self.list())?)
    }

    /// Import proposals from a JSON array, returning how many were added
    ///
    /// Proposals whose id is already known are skipped.
    pub fn import_proposals(&self, json: &str) -> Result<usize, ProposalError> {
        let incoming: Vec<RelationshipProposal> = serde_json::from_str(json)?;

        let mut registry = self.registry.write();
        let mut added = 0;
        for proposal in incoming {
            if registry.proposals.contains_key(&proposal.id) {
                continue;
            }
            registry.insert(proposal);
            added += 1;
        }
        info!(added, total = registry.proposals.len(), "Imported proposals");
        Ok(added)
    }
}

fn is_snake_case(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_lowercase())
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn definition_from(proposal: &RelationshipProposal) -> RelationshipDefinition {
    RelationshipDefinition {
        type_id: proposal.proposed_name.clone(),
        name: proposal.proposed_name.replace('_', " "),
        description: proposal.description.clone(),
        category: RelationshipCategory::Discovered,
        domain: proposal.domain_type,
        range: proposal.range_type,
        symmetric: false,
        transitive: false,
        property_schema: proposal.property_schema.clone(),
        validation_rules: proposal.validation_rules.clone(),
        examples: proposal.examples.clone(),
        origin: DefinitionOrigin::Proposal {
            proposal_id: proposal.id.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galen_domain::{ClinicalValidity, EntityType, PropertySchema};

    fn manager() -> ProposalManager {
        ProposalManager::new(
            Arc::new(Vocabulary::clinical().unwrap()),
            GovernanceConfig::default(),
        )
        .unwrap()
    }

    fn candidate(id: &str, class: &str, source: &str, target: &str) -> RelationshipCandidate {
        RelationshipCandidate {
            id: id.to_string(),
            source_entity: source.to_string(),
            target_entity: target.to_string(),
            source_type: EntityType::Medication,
            target_type: EntityType::Condition,
            relationship_class: class.to_string(),
            confidence_score: 0.66,
            clinical_validity: ClinicalValidity::Probable,
            similar_existing_types: Vec::new(),
            evidence_sources: vec!["ada".to_string()],
            evidence_text: format!("{} is used to treat {}.", source, target),
            property_schema: PropertySchema::new(),
            discovered_at: 0,
            reviewed: false,
            approved: false,
        }
    }

    #[test]
    fn test_proposal_from_templates() {
        let proposal = manager()
            .generate_proposal(&candidate("candidate_1", "treatment", "Metformin", "type 2 diabetes"))
            .unwrap();
        assert_eq!(proposal.proposed_name, "medication_treats_condition");
        assert!(proposal.description.contains("Metformin"));
        assert_eq!(proposal.domain_type, EntityType::Medication);
        assert_eq!(proposal.range_type, EntityType::Condition);
        assert_eq!(proposal.status, ProposalStatus::Pending);

        let rules: Vec<&str> = proposal.validation_rules.iter().map(|r| r.name()).collect();
        assert_eq!(
            rules,
            vec!["source_type", "target_type", "requires_evidence", "min_confidence"]
        );
    }

    #[test]
    fn test_unknown_class_uses_generic_template() {
        let proposal = manager()
            .generate_proposal(&candidate("candidate_1", "monitoring", "HbA1c", "diabetes"))
            .unwrap();
        assert_eq!(proposal.proposed_name, "test_monitoring_condition");
    }

    #[test]
    fn test_generate_twice_returns_same_proposal() {
        let manager = manager();
        let c = candidate("candidate_1", "treatment", "Metformin", "diabetes");
        let first = manager.generate_proposal(&c).unwrap();
        let second = manager.generate_proposal(&c).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(manager.list().len(), 1);
    }

    #[test]
    fn test_rejected_candidate_is_refused() {
        let manager = manager();
        let c = candidate("candidate_1", "treatment", "Metformin", "diabetes");
        let proposal = manager.generate_proposal(&c).unwrap();
        manager.reject(&proposal.id, "dr.lee", "duplicate of treats").unwrap();

        assert!(matches!(
            manager.generate_proposal(&c),
            Err(ProposalError::CandidateRejected(_))
        ));
        assert!(matches!(
            manager.approve(&proposal.id, "dr.lee"),
            Err(ProposalError::AlreadyDecided { .. })
        ));
        assert!(manager.pending().is_empty());
    }

    #[test]
    fn test_approve_twice() {
        let manager = manager();
        let proposal = manager
            .generate_proposal(&candidate("candidate_1", "treatment", "Metformin", "diabetes"))
            .unwrap();
        assert!(manager.approve(&proposal.id, "dr.lee").unwrap());
        assert!(!manager.approve(&proposal.id, "dr.kim").unwrap());

        let approved = manager.get(&proposal.id).unwrap();
        assert_eq!(approved.reviewed_by.as_deref(), Some("dr.lee"));
        assert!(approved.approved_at.is_some());
    }

    #[test]
    fn test_unknown_proposal() {
        assert!(matches!(
            manager().approve("nope", "dr.lee"),
            Err(ProposalError::ProposalNotFound(_))
        ));
    }
}
