//! Proposal lifecycle commands.

use crate::error::Result;
use crate::output::Formatter;
use crate::workspace::Workspace;
use galen_discovery::DiscoveryError;
use galen_governance::{ActivationOutcome, ProposalError};
use galen_domain::RelationshipProposal;
use serde_json::json;

/// Execute the propose command.
pub fn execute_propose(candidate_id: &str, workspace: &Workspace, formatter: &Formatter) -> Result<String> {
    let candidate = workspace
        .engine
        .get(candidate_id)
        .ok_or_else(|| DiscoveryError::CandidateNotFound(candidate_id.to_string()))?;
    let proposal = workspace.proposals.generate_proposal(&candidate)?;
    workspace.save_proposals()?;
    formatter.format_value(&proposal, &proposal.id)
}

/// Execute the proposals command.
pub fn execute_proposals(pending: bool, workspace: &Workspace, formatter: &Formatter) -> Result<String> {
    let proposals = if pending {
        workspace.proposals.pending()
    } else {
        workspace.proposals.list()
    };
    formatter.format_proposals(&proposals)
}

/// Execute the approve command.
pub fn execute_approve(
    proposal_id: &str,
    reviewer: &str,
    workspace: &Workspace,
    formatter: &Formatter,
) -> Result<String> {
    if workspace.proposals.approve(proposal_id, reviewer)? {
        let proposal = lookup(workspace, proposal_id)?;
        record_review(workspace, &proposal, true)?;
        workspace.save_proposals()?;
    }
    let proposal = lookup(workspace, proposal_id)?;
    formatter.format_value(&proposal, &proposal.id)
}

/// Execute the reject command.
pub fn execute_reject(
    proposal_id: &str,
    reviewer: &str,
    reason: &str,
    workspace: &Workspace,
    formatter: &Formatter,
) -> Result<String> {
    let proposal = workspace.proposals.reject(proposal_id, reviewer, reason)?;
    record_review(workspace, &proposal, false)?;
    workspace.save_proposals()?;
    formatter.format_value(&proposal, &proposal.id)
}

/// Execute the activate command.
pub fn execute_activate(
    proposal_id: &str,
    type_id: Option<&str>,
    workspace: &Workspace,
    formatter: &Formatter,
) -> Result<String> {
    let outcome = workspace
        .proposals
        .activate_as(proposal_id, type_id, &workspace.catalog)?;
    if outcome == ActivationOutcome::Activated {
        workspace.save_catalog()?;
    }
    workspace.save_proposals()?;

    let proposal = lookup(workspace, proposal_id)?;
    let result = json!({
        "proposal_id": proposal.id,
        "type_id": proposal.proposed_name,
        "outcome": outcome,
    });
    formatter.format_value(&result, &proposal.proposed_name)
}

fn lookup(workspace: &Workspace, proposal_id: &str) -> Result<RelationshipProposal> {
    Ok(workspace
        .proposals
        .get(proposal_id)
        .ok_or_else(|| ProposalError::ProposalNotFound(proposal_id.to_string()))?)
}

/// Mirror a proposal decision onto its candidate, if the candidate is still held.
fn record_review(workspace: &Workspace, proposal: &RelationshipProposal, approved: bool) -> Result<()> {
    if workspace.engine.get(&proposal.candidate_id).is_some() {
        workspace.engine.mark_reviewed(&proposal.candidate_id, approved)?;
        workspace.save_candidates()?;
    }
    Ok(())
}
