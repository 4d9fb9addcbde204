//! Galen Relationship Discovery
//!
//! Mines candidate relationships from guideline text and scores them.
//!
//! # Overview
//!
//! Discovery runs in three steps:
//! 1. **Extraction**: [`EntityPairExtractor`] finds entity mentions and pairs
//!    mentions joined by a relationship indicator phrase
//! 2. **Scoring**: [`ContextAnalyzer`] blends evidence strength, clinical
//!    relevance, and type-pairing consistency into a confidence score
//! 3. **Collection**: [`RelationshipDiscoveryEngine`] attaches similar catalog
//!    types, drops weak pairs, and numbers the surviving candidates
//!
//! All keyword lists, indicator phrases, templates, and scoring tables come
//! from one data table, the [`Vocabulary`]. Adding a relationship class is a
//! data change.
//!
//! # Examples
//!
//! ```
//! use galen_discovery::{DiscoveryConfig, EntityPairExtractor, Vocabulary};
//! use std::sync::Arc;
//!
//! let extractor = EntityPairExtractor::new(
//!     Arc::new(Vocabulary::clinical().unwrap()),
//!     DiscoveryConfig::default(),
//! );
//! let pairs = extractor.extract_pairs("Hypertension is managed with diuretics.");
//! assert_eq!(pairs[0].source.text, "diuretics");
//! ```

#![warn(missing_docs)]

mod analyzer;
mod config;
mod engine;
mod error;
mod extractor;
mod vocabulary;

pub use analyzer::{
    Assessment, ContextAnalyzer, CONSISTENCY_WEIGHT, EVIDENCE_WEIGHT, RELEVANCE_WEIGHT,
};
pub use config::DiscoveryConfig;
pub use engine::{DocumentDiscoveryReport, RelationshipDiscoveryEngine, SectionFailure};
pub use error::{DiscoveryError, VocabularyError};
pub use extractor::{EntityPair, EntityPairExtractor, Mention};
pub use vocabulary::{
    render_template, EntityMatcher, EvidenceTier, RelationshipClass, Vocabulary,
};
