//! Error types for the CLI application.

use galen_assembler::AssemblyError;
use galen_catalog::CatalogError;
use galen_discovery::{DiscoveryError, VocabularyError};
use galen_governance::ProposalError;
use galen_store::StoreError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Document store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Vocabulary error
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),

    /// Discovery error
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Governance error
    #[error(transparent)]
    Proposal(#[from] ProposalError),

    /// Assembly error
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CliError {
    /// The `{"error": message}` payload printed on failure.
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }
}
