//! Error types for the document store

use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// File extension does not map to a known format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// No text could be extracted from the source
    #[error("Empty content: no text extracted from {0}")]
    EmptyContent(String),

    /// Document id was never loaded (or has been deleted)
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Section id does not exist in the document
    #[error("Section not found: {section_id} in document {document_id}")]
    SectionNotFound {
        /// Owning document
        document_id: String,
        /// Requested section
        section_id: String,
    },

    /// Anchor id was never created
    #[error("Anchor not found: {0}")]
    AnchorNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
