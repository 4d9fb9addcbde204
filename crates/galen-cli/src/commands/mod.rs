//! Command implementations.
//!
//! Each command returns the text to print; the binary writes it to stdout.

pub mod anchors;
pub mod assembly;
pub mod catalog;
pub mod discovery;
pub mod documents;
pub mod governance;

pub use self::anchors::{execute_anchor, execute_resolve};
pub use self::assembly::{execute_assemble, execute_nodes};
pub use self::catalog::execute_catalog;
pub use self::discovery::{execute_candidates, execute_discover};
pub use self::documents::{execute_content, execute_documents, execute_load, execute_toc};
pub use self::governance::{
    execute_activate, execute_approve, execute_propose, execute_proposals, execute_reject,
};

use crate::cli::Command;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::workspace::Workspace;

/// Dispatch a parsed command.
pub fn execute(command: Command, workspace: &Workspace, formatter: &Formatter) -> Result<String> {
    match command {
        Command::Load(args) => execute_load(args, workspace, formatter),
        Command::Documents => execute_documents(workspace, formatter),
        Command::Toc { document } => execute_toc(&document, workspace, formatter),
        Command::Content { document, section } => {
            execute_content(&document, section.as_deref(), workspace)
        }
        Command::Anchor(args) => execute_anchor(args, workspace, formatter),
        Command::Resolve { anchor } => execute_resolve(&anchor, workspace, formatter),
        Command::Discover(args) => execute_discover(args, workspace, formatter),
        Command::Candidates { min_confidence } => {
            execute_candidates(min_confidence, workspace, formatter)
        }
        Command::Propose { candidate } => execute_propose(&candidate, workspace, formatter),
        Command::Proposals { pending } => execute_proposals(pending, workspace, formatter),
        Command::Approve { proposal, reviewer } => {
            execute_approve(&proposal, &reviewer, workspace, formatter)
        }
        Command::Reject {
            proposal,
            reviewer,
            reason,
        } => execute_reject(&proposal, &reviewer, &reason, workspace, formatter),
        Command::Activate { proposal, type_id } => {
            execute_activate(&proposal, type_id.as_deref(), workspace, formatter)
        }
        Command::Assemble { document, layer } => {
            execute_assemble(&document, layer.map(Into::into), workspace, formatter)
        }
        Command::Nodes { document, layer } => {
            execute_nodes(&document, layer.into(), workspace, formatter)
        }
        Command::Catalog(args) => execute_catalog(args.action, workspace, formatter),
    }
}

/// Split a `key=value` argument.
pub(crate) fn parse_pair(input: &str) -> Result<(String, String)> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(CliError::InvalidInput(format!(
            "Invalid pair '{}'. Expected 'key=value'",
            input
        ))),
    }
}
