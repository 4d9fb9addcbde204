//! Relationship discovery commands.

use crate::cli::DiscoverArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::workspace::Workspace;
use tracing::warn;

/// Execute the discover command.
pub fn execute_discover(
    args: DiscoverArgs,
    workspace: &Workspace,
    formatter: &Formatter,
) -> Result<String> {
    let candidates = match (args.document, args.text) {
        (Some(document_id), _) => {
            let report = workspace
                .engine
                .discover_document(&workspace.store, &document_id)?;
            for failure in &report.failures {
                warn!(
                    document_id = %report.document_id,
                    section_id = %failure.section_id,
                    error = %failure.error,
                    "Section skipped"
                );
            }
            report.candidates
        }
        (None, Some(text)) => workspace.engine.discover(&text, &args.source),
        (None, None) => {
            return Err(CliError::InvalidInput(
                "Either --document or --text is required".to_string(),
            ))
        }
    };

    workspace.save_candidates()?;
    formatter.format_candidates(&candidates)
}

/// Execute the candidates command.
pub fn execute_candidates(
    min_confidence: Option<f64>,
    workspace: &Workspace,
    formatter: &Formatter,
) -> Result<String> {
    if let Some(min) = min_confidence {
        if !(0.0..=1.0).contains(&min) {
            return Err(CliError::InvalidInput(
                "Confidence must be between 0.0 and 1.0".to_string(),
            ));
        }
    }

    let candidates: Vec<_> = workspace
        .engine
        .candidates()
        .into_iter()
        .filter(|c| min_confidence.is_none_or(|min| c.confidence_score >= min))
        .collect();
    formatter.format_candidates(&candidates)
}
