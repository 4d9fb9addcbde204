//! Graph assembly commands.

use crate::error::Result;
use crate::output::Formatter;
use crate::workspace::Workspace;
use galen_domain::ProcessingLayer;

/// Execute the assemble command.
///
/// Without a layer every stage runs in order; with one, only that stage runs
/// and its predecessor must already be assembled.
pub fn execute_assemble(
    document_id: &str,
    layer: Option<ProcessingLayer>,
    workspace: &Workspace,
    formatter: &Formatter,
) -> Result<String> {
    let assembler = workspace.assembler(document_id)?;
    let reports = match layer {
        Some(layer) => vec![assembler.run_stage(document_id, layer)?],
        None => assembler.run_all(document_id)?,
    };
    workspace.save_graph(&assembler, document_id)?;
    formatter.format_reports(&reports)
}

/// Execute the nodes command.
pub fn execute_nodes(
    document_id: &str,
    layer: ProcessingLayer,
    workspace: &Workspace,
    formatter: &Formatter,
) -> Result<String> {
    workspace.store.get_document(document_id)?;
    let assembler = workspace.assembler(document_id)?;
    formatter.format_nodes(&assembler.get_nodes(document_id, layer))
}
