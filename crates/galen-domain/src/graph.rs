//! Layered knowledge graph nodes
//!
//! Assembly proceeds through four processing layers. Every node carries the
//! anchors it was derived from, so any fact can be traced back to its text.

use crate::{EntityType, Span, Violation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Assembly stage a node belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingLayer {
    /// Layer 0: section text
    RawText,
    /// Layer 1: concepts and typed relationships
    StructuredKnowledge,
    /// Layer 2: rule envelopes
    ComputableLogic,
    /// Layer 3: workflow envelopes
    ExecutableWorkflows,
}

impl ProcessingLayer {
    /// Every layer in stage order
    pub const ALL: [ProcessingLayer; 4] = [
        ProcessingLayer::RawText,
        ProcessingLayer::StructuredKnowledge,
        ProcessingLayer::ComputableLogic,
        ProcessingLayer::ExecutableWorkflows,
    ];

    /// Stage number (0-3)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Layer from its stage number
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The stage that must complete before this one
    pub fn previous(&self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// The stage after this one
    pub fn next(&self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// Get the layer name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingLayer::RawText => "RAW_TEXT",
            ProcessingLayer::StructuredKnowledge => "STRUCTURED_KNOWLEDGE",
            ProcessingLayer::ComputableLogic => "COMPUTABLE_LOGIC",
            ProcessingLayer::ExecutableWorkflows => "EXECUTABLE_WORKFLOWS",
        }
    }

    /// Parse a layer from its name or stage number
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return Self::from_index(index);
        }
        let normalized = s.to_uppercase().replace('-', "_");
        Self::ALL.into_iter().find(|l| l.as_str() == normalized)
    }
}

impl fmt::Display for ProcessingLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProcessingLayer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid processing layer: {}", s))
    }
}

/// A clinical concept extracted from a section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    /// Deterministic concept id
    pub id: String,
    /// Surface text as found
    pub name: String,
    /// Vocabulary type
    pub entity_type: EntityType,
    /// Extraction confidence
    pub confidence: f64,
    /// Anchor pointing at the mention
    pub anchor_id: String,
}

/// A typed relationship between two concepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipInstance {
    /// Deterministic instance id
    pub id: String,
    /// Catalog type id
    pub type_id: String,
    /// Source concept id
    pub source_concept: String,
    /// Target concept id
    pub target_concept: String,
    /// Instance properties, checked against the definition's schema
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
    /// Discovery confidence
    pub confidence: f64,
    /// Context text the relationship was read from
    pub evidence_text: String,
    /// Anchor pointing at the evidence
    pub anchor_id: String,
    /// Advisory validation findings
    #[serde(default)]
    pub warnings: Vec<Violation>,
}

/// An executable rule derived from a relationship
///
/// Only the envelope is produced; `body` is filled by an external rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEnvelope {
    /// Target rule engine tag
    pub engine: String,
    /// Relationship node this rule was derived from
    pub source_relationship: String,
    /// Engine-specific rule body
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

/// A workflow derived from a section's rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEnvelope {
    /// Target workflow engine tag
    pub engine: String,
    /// Rule nodes this workflow sequences
    pub rule_ids: Vec<String>,
    /// Engine-specific workflow body
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

/// Layer-specific node content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodePayload {
    /// Layer 0 section text
    SectionText {
        /// Section title
        title: String,
        /// Heading level
        level: u8,
        /// Span in the document text
        span: Span,
    },
    /// Layer 1 concept
    Concept(Concept),
    /// Layer 1 relationship
    Relationship(RelationshipInstance),
    /// Layer 2 rule
    Rule(RuleEnvelope),
    /// Layer 3 workflow
    Workflow(WorkflowEnvelope),
}

/// A node in the layered knowledge graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Deterministic node id
    pub id: String,

    /// Stage that produced the node
    pub processing_layer: ProcessingLayer,

    /// Owning document
    pub document_id: String,

    /// Owning section
    pub section_id: String,

    /// Provenance anchors; never empty for layers above raw text
    #[serde(default)]
    pub anchor_ids: Vec<String>,

    /// Lower-layer nodes this node was derived from
    #[serde(default)]
    pub derived_from: Vec<String>,

    /// Layer-specific content
    pub payload: NodePayload,
}

impl GraphNode {
    /// Whether the node carries at least one anchor
    pub fn is_anchored(&self) -> bool {
        !self.anchor_ids.is_empty()
    }
}
