//! Document store commands.

use super::parse_pair;
use crate::cli::LoadArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::workspace::Workspace;
use galen_domain::DocumentMetadata;

/// Execute the load command.
pub fn execute_load(args: LoadArgs, workspace: &Workspace, formatter: &Formatter) -> Result<String> {
    let source = args
        .source
        .unwrap_or_else(|| args.path.display().to_string());
    let mut metadata = DocumentMetadata::new(source, args.doc_version);
    if let Some(title) = args.title {
        metadata = metadata.with_title(title);
    }
    for pair in &args.meta {
        let (key, value) = parse_pair(pair)?;
        metadata = metadata.with_extra(key, value);
    }

    let document = workspace.store.load_file(&args.path, metadata)?;
    formatter.format_value(&document, &document.id)
}

/// Execute the documents command.
pub fn execute_documents(workspace: &Workspace, formatter: &Formatter) -> Result<String> {
    formatter.format_documents(&workspace.store.list_documents())
}

/// Execute the toc command.
pub fn execute_toc(document_id: &str, workspace: &Workspace, formatter: &Formatter) -> Result<String> {
    formatter.format_toc(&workspace.store.table_of_contents(document_id)?)
}

/// Execute the content command. Text is printed as-is in every format.
pub fn execute_content(
    document_id: &str,
    section_id: Option<&str>,
    workspace: &Workspace,
) -> Result<String> {
    Ok(workspace.store.get_content(document_id, section_id)?)
}
