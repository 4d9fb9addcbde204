//! Relationship proposals awaiting human review

use crate::{EntityType, PropertySchema, ValidationRule};
use serde::{Deserialize, Serialize};

/// Lifecycle stage of a proposal
///
/// `Pending → Approved → Activated`, or `Pending → Rejected` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Awaiting review
    #[default]
    Pending,
    /// Approved; eligible for catalog activation
    Approved,
    /// Rejected and archived permanently
    Rejected,
    /// Registered in the catalog
    Activated,
}

impl ProposalStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Activated => "activated",
        }
    }
}

/// A formal write-up of a candidate pending approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipProposal {
    /// Proposal id (UUIDv7)
    pub id: String,

    /// Candidate this proposal was generated from
    pub candidate_id: String,

    /// Proposed type id / name
    pub proposed_name: String,

    /// Proposed description
    pub description: String,

    /// Inferred source entity type
    pub domain_type: EntityType,

    /// Inferred target entity type
    pub range_type: EntityType,

    /// Property schema copied from the candidate
    #[serde(default)]
    pub property_schema: PropertySchema,

    /// Core rule set plus any class-specific rules
    #[serde(default)]
    pub validation_rules: Vec<ValidationRule>,

    /// Worked examples
    #[serde(default)]
    pub examples: Vec<String>,

    /// Creation time (seconds since epoch)
    pub created_at: u64,

    /// Reviewer who approved or rejected
    #[serde(default)]
    pub reviewed_by: Option<String>,

    /// Whether the proposal was approved
    #[serde(default)]
    pub approved: bool,

    /// Approval time (seconds since epoch)
    #[serde(default)]
    pub approved_at: Option<u64>,

    /// Lifecycle stage
    #[serde(default)]
    pub status: ProposalStatus,

    /// Reviewer's reason for rejection
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl RelationshipProposal {
    /// Generate a fresh proposal id
    pub fn new_id() -> String {
        uuid::Uuid::now_v7().to_string()
    }

    /// Whether the proposal is still awaiting a decision
    pub fn is_pending(&self) -> bool {
        self.status == ProposalStatus::Pending
    }
}
