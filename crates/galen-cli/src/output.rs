//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use galen_assembler::StageReport;
use galen_domain::{
    Document, GraphNode, NodePayload, RelationshipCandidate, RelationshipDefinition,
    RelationshipProposal, TocEntry,
};
use serde::Serialize;
use std::sync::Arc;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a single record. Tables fall back to JSON; quiet prints `id`.
    pub fn format_value<T: Serialize>(&self, value: &T, id: &str) -> Result<String> {
        match self.format {
            OutputFormat::Quiet => Ok(id.to_string()),
            OutputFormat::Json | OutputFormat::Table => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    /// Format stored documents.
    pub fn format_documents(&self, documents: &[Document]) -> Result<String> {
        self.render(
            documents,
            &["ID", "Title", "Source", "Version", "Format", "Sections"],
            |d| {
                vec![
                    d.id.clone(),
                    d.title.clone(),
                    d.source.clone(),
                    d.version.clone(),
                    d.format.as_str().to_string(),
                    d.sections.len().to_string(),
                ]
            },
            |d| d.id.clone(),
            "No documents found.",
        )
    }

    /// Format a table of contents.
    pub fn format_toc(&self, entries: &[TocEntry]) -> Result<String> {
        self.render(
            entries,
            &["Section", "Level", "Title"],
            |e| {
                vec![
                    e.section_id.clone(),
                    e.level.to_string(),
                    format!("{}{}", "  ".repeat(e.depth), e.title),
                ]
            },
            |e| e.section_id.clone(),
            "No sections found.",
        )
    }

    /// Format relationship candidates.
    pub fn format_candidates(&self, candidates: &[RelationshipCandidate]) -> Result<String> {
        self.render(
            candidates,
            &["ID", "Source", "Class", "Target", "Confidence", "Validity", "Similar"],
            |c| {
                vec![
                    c.id.clone(),
                    format!("{} ({})", c.source_entity, c.source_type),
                    c.relationship_class.clone(),
                    format!("{} ({})", c.target_entity, c.target_type),
                    format!("{:.2}", c.confidence_score),
                    c.clinical_validity.to_string(),
                    c.best_similar_type().unwrap_or("-").to_string(),
                ]
            },
            |c| c.id.clone(),
            "No candidates found.",
        )
    }

    /// Format governance proposals.
    pub fn format_proposals(&self, proposals: &[RelationshipProposal]) -> Result<String> {
        self.render(
            proposals,
            &["ID", "Candidate", "Name", "Domain", "Range", "Status", "Reviewer"],
            |p| {
                vec![
                    p.id.clone(),
                    p.candidate_id.clone(),
                    p.proposed_name.clone(),
                    p.domain_type.to_string(),
                    p.range_type.to_string(),
                    self.status(p.status.as_str()),
                    p.reviewed_by.clone().unwrap_or_else(|| "-".to_string()),
                ]
            },
            |p| p.id.clone(),
            "No proposals found.",
        )
    }

    /// Format catalog definitions.
    pub fn format_definitions(&self, definitions: &[Arc<RelationshipDefinition>]) -> Result<String> {
        let definitions: Vec<RelationshipDefinition> =
            definitions.iter().map(|d| d.as_ref().clone()).collect();
        self.render(
            &definitions,
            &["Type", "Name", "Category", "Domain", "Range"],
            |d| {
                vec![
                    d.type_id.clone(),
                    d.name.clone(),
                    d.category.as_str().to_string(),
                    d.domain.to_string(),
                    d.range.to_string(),
                ]
            },
            |d| d.type_id.clone(),
            "No definitions found.",
        )
    }

    /// Format graph nodes.
    pub fn format_nodes(&self, nodes: &[GraphNode]) -> Result<String> {
        self.render(
            nodes,
            &["ID", "Section", "Kind", "Summary", "Anchors"],
            |n| {
                let (kind, summary) = describe(&n.payload);
                vec![
                    n.id.clone(),
                    n.section_id.clone(),
                    kind.to_string(),
                    summary,
                    n.anchor_ids.len().to_string(),
                ]
            },
            |n| n.id.clone(),
            "No nodes found.",
        )
    }

    /// Format stage reports.
    pub fn format_reports(&self, reports: &[StageReport]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(reports)?),
            OutputFormat::Quiet => Ok(reports
                .iter()
                .map(|r| r.layer.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => Ok(reports
                .iter()
                .map(|r| {
                    if r.is_clean() {
                        self.success(&r.summary())
                    } else {
                        self.warning(&r.summary())
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn render<T: Serialize>(
        &self,
        items: &[T],
        header: &[&str],
        row: impl Fn(&T) -> Vec<String>,
        id: impl Fn(&T) -> String,
        empty: &str,
    ) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
            OutputFormat::Quiet => Ok(items.iter().map(id).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                if items.is_empty() {
                    return Ok(self.colorize(empty, "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(header.iter().copied());
                for item in items {
                    builder.push_record(row(item));
                }

                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn status(&self, status: &str) -> String {
        let color = match status {
            "approved" | "activated" => "green",
            "rejected" => "red",
            _ => "cyan",
        };
        self.colorize(status, color)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Node kind and a one-line summary for table output.
fn describe(payload: &NodePayload) -> (&'static str, String) {
    match payload {
        NodePayload::SectionText { title, level, .. } => ("section", format!("{} (h{})", title, level)),
        NodePayload::Concept(c) => ("concept", format!("{} [{}]", c.name, c.entity_type)),
        NodePayload::Relationship(r) => (
            "relationship",
            format!("{} -{}-> {}", r.source_concept, r.type_id, r.target_concept),
        ),
        NodePayload::Rule(r) => ("rule", format!("{} <- {}", r.engine, r.source_relationship)),
        NodePayload::Workflow(w) => ("workflow", format!("{} ({} rules)", w.engine, w.rule_ids.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galen_domain::{ClinicalValidity, EntityType};
    use std::collections::BTreeMap;

    fn create_test_candidate() -> RelationshipCandidate {
        RelationshipCandidate {
            id: "candidate_1".to_string(),
            source_entity: "Metformin".to_string(),
            target_entity: "type 2 diabetes".to_string(),
            source_type: EntityType::Medication,
            target_type: EntityType::Condition,
            relationship_class: "treatment".to_string(),
            confidence_score: 0.66,
            clinical_validity: ClinicalValidity::Probable,
            similar_existing_types: vec![("treats".to_string(), 0.8)],
            evidence_sources: vec!["cli".to_string()],
            evidence_text: "Metformin is used to treat type 2 diabetes".to_string(),
            property_schema: BTreeMap::new(),
            discovered_at: 0,
            reviewed: false,
            approved: false,
        }
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_candidates(&[create_test_candidate()]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["clinical_validity"], "probable");
        assert_eq!(parsed[0]["similar_existing_types"][0][0], "treats");
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_candidates(&[create_test_candidate()]).unwrap();
        assert_eq!(output, "candidate_1");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_candidates(&[create_test_candidate()]).unwrap();
        assert!(output.contains("Confidence"));
        assert!(output.contains("0.66"));
        assert!(output.contains("treats"));
    }

    #[test]
    fn test_empty_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_proposals(&[]).unwrap();
        assert!(output.contains("No proposals found"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
