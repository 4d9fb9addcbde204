//! Galen Domain Layer
//!
//! This crate contains the core data model for Galen, a provenance-anchored
//! clinical knowledge graph. It defines the value objects every other layer
//! depends upon and carries no I/O of its own.
//!
//! ## Key Concepts
//!
//! - **Document / Section**: a guideline split into a heading-derived tree
//! - **Anchor**: a provenance pointer from derived knowledge back to exact source text
//! - **RelationshipDefinition**: an immutable catalog entry describing a relationship kind
//! - **RelationshipCandidate**: a scored, unapproved hypothesis mined from text
//! - **RelationshipProposal**: a reviewable write-up of a candidate
//! - **ClinicalValidity**: validity tier derived purely from a confidence score
//! - **ProcessingLayer**: the four stages of graph assembly (raw text → workflows)
//!
//! ## Architecture
//!
//! - Pure data and deterministic helpers only
//! - Storage, extraction, and governance live in other crates
//! - `serde` derives are the interchange contract for export and durability

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod anchor;
pub mod candidate;
pub mod clock;
pub mod document;
pub mod entity;
pub mod graph;
pub mod hashing;
pub mod ontology;
pub mod proposal;
pub mod text;
pub mod validity;

// Re-exports for convenience
pub use anchor::{Anchor, AnchorResolution, ContextWindow};
pub use candidate::RelationshipCandidate;
pub use clock::current_timestamp;
pub use document::{Document, DocumentFormat, DocumentMetadata, Section, Span, TocEntry};
pub use entity::EntityType;
pub use graph::{
    Concept, GraphNode, NodePayload, ProcessingLayer, RelationshipInstance, RuleEnvelope,
    WorkflowEnvelope,
};
pub use ontology::{
    DefinitionOrigin, PropertyKind, PropertySchema, PropertySpec, RelationshipCategory,
    RelationshipDefinition, ValidationRule, Violation,
};
pub use proposal::{ProposalStatus, RelationshipProposal};
pub use validity::ClinicalValidity;
