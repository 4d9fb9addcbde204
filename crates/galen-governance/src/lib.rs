//! Galen Governance
//!
//! Turns scored relationship candidates into formal proposals and controls
//! how they become permanent catalog entries.
//!
//! # Lifecycle
//!
//! ```text
//! candidate ──generate──▶ pending ──approve──▶ approved ──activate──▶ activated
//!                            │
//!                            └──reject──▶ rejected (candidate refused forever)
//! ```
//!
//! Approval is a review decision only. Registration in the catalog happens
//! solely through an explicit activation of an approved proposal.

#![warn(missing_docs)]

mod config;
mod error;
mod manager;

pub use config::GovernanceConfig;
pub use error::ProposalError;
pub use manager::{ActivationOutcome, ProposalManager};
