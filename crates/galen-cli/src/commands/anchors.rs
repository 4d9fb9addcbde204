//! Anchor commands.

use crate::cli::AnchorArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::workspace::Workspace;

/// Execute the anchor command.
pub fn execute_anchor(args: AnchorArgs, workspace: &Workspace, formatter: &Formatter) -> Result<String> {
    let position = match args.position {
        Some(position) => position,
        None => default_position(workspace, &args)?,
    };
    let context = args.context.as_deref().unwrap_or(&args.text);

    let anchor_id = workspace.store.create_anchor(
        &args.document,
        &args.section,
        &args.text,
        &args.anchor_type,
        position,
        context,
    )?;
    let anchor = workspace.store.get_anchor(&anchor_id)?;
    formatter.format_value(&anchor, &anchor_id)
}

/// Execute the resolve command.
pub fn execute_resolve(anchor_id: &str, workspace: &Workspace, formatter: &Formatter) -> Result<String> {
    let resolution = workspace.store.resolve_anchor(anchor_id)?;
    formatter.format_value(&resolution, anchor_id)
}

/// First occurrence of the text at or after its section's start, else the section start.
fn default_position(workspace: &Workspace, args: &AnchorArgs) -> Result<usize> {
    let document = workspace.store.get_document(&args.document)?;
    let start = document
        .section(&args.section)
        .map_or(0, |section| section.span.start);
    let content = workspace.store.get_content(&args.document, None)?;
    Ok(content
        .get(start..)
        .and_then(|tail| tail.find(&args.text))
        .map_or(start, |offset| start + offset))
}
