//! Governance error types

use galen_catalog::CatalogError;
use thiserror::Error;

/// Errors that can occur while managing proposals
#[derive(Error, Debug)]
pub enum ProposalError {
    /// No proposal with this id
    #[error("Proposal not found: {0}")]
    ProposalNotFound(String),

    /// The candidate's proposal was rejected; it can never be proposed again
    #[error("Candidate was rejected: {0}")]
    CandidateRejected(String),

    /// Activation requires an approved proposal
    #[error("Proposal is not approved: {0}")]
    NotApproved(String),

    /// The proposal already carries a conflicting decision
    #[error("Proposal {proposal_id} is already {status}")]
    AlreadyDecided {
        /// Proposal id
        proposal_id: String,
        /// Current status
        status: String,
    },

    /// Type id override that is not lowercase snake case
    #[error("Invalid type id: {0}")]
    InvalidName(String),

    /// Catalog registration failed
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration rejected by validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Export or import failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
