//! Galen Graph Assembler
//!
//! Walks stored documents and the ontology catalog to build a layered,
//! provenance-anchored knowledge graph.
//!
//! # Layers
//!
//! | Layer | Nodes | Built from |
//! |-------|-------|------------|
//! | `RAW_TEXT` | one per section | the document's section tree |
//! | `STRUCTURED_KNOWLEDGE` | concepts and typed relationships | section text, vocabulary, catalog |
//! | `COMPUTABLE_LOGIC` | rule envelopes | relationships |
//! | `EXECUTABLE_WORKFLOWS` | workflow envelopes | rules, grouped per section |
//!
//! Every node carries at least one anchor that resolves back to the text it
//! came from. Rule and workflow envelopes are placeholders: they record the
//! target engine and the nodes they derive from, with an empty body.

#![warn(missing_docs)]

mod assembler;
mod config;
mod error;
mod report;
mod stages;

pub use assembler::{GraphAssembler, GraphSnapshot};
pub use config::AssemblerConfig;
pub use error::AssemblyError;
pub use report::StageReport;
