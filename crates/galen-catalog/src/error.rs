//! Error types for the catalog

use thiserror::Error;

/// Errors that can occur during catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A definition with this type id is already registered
    #[error("Duplicate relationship type: {0}")]
    DuplicateType(String),

    /// Definition is structurally unusable
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing failure
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
