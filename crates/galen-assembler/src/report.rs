//! Per-stage run reports

use galen_discovery::SectionFailure;
use galen_domain::ProcessingLayer;
use serde::{Deserialize, Serialize};

/// Outcome of running one assembly stage over a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// Document id
    pub document_id: String,

    /// Stage that ran
    pub layer: ProcessingLayer,

    /// Nodes in the stage's node set after the run
    pub nodes: usize,

    /// Nodes the run replaced
    pub replaced: usize,

    /// Sections that failed; the stage still completed for the others
    pub failures: Vec<SectionFailure>,
}

impl StageReport {
    /// Whether every section was processed
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line summary for logs and terminals
    pub fn summary(&self) -> String {
        format!(
            "{} {}: {} nodes ({} replaced), {} failed sections",
            self.document_id,
            self.layer,
            self.nodes,
            self.replaced,
            self.failures.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let report = StageReport {
            document_id: "doc_1".to_string(),
            layer: ProcessingLayer::ComputableLogic,
            nodes: 4,
            replaced: 4,
            failures: vec![SectionFailure {
                section_id: "s2".to_string(),
                error: "boom".to_string(),
            }],
        };
        assert!(!report.is_clean());
        assert_eq!(
            report.summary(),
            "doc_1 COMPUTABLE_LOGIC: 4 nodes (4 replaced), 1 failed sections"
        );
    }
}
