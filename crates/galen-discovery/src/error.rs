//! Error types for relationship discovery

use galen_store::StoreError;
use thiserror::Error;

/// Errors raised while loading or compiling a vocabulary
#[derive(Error, Debug)]
pub enum VocabularyError {
    /// TOML parsing failure
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A keyword list or pattern did not compile
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Offending pattern
        pattern: String,
        /// Regex compiler error
        #[source]
        source: regex::Error,
    },

    /// Table content is inconsistent
    #[error("Invalid vocabulary: {0}")]
    Invalid(String),
}

/// Errors that can occur in the discovery engine
///
/// Extraction and scoring themselves never fail; these cover configuration,
/// lookups, and interchange.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Vocabulary could not be loaded
    #[error("Vocabulary error: {0}")]
    Vocabulary(#[from] VocabularyError),

    /// Configuration rejected by validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// No candidate with this id
    #[error("Candidate not found: {0}")]
    CandidateNotFound(String),

    /// Document store lookup failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Export or import failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
