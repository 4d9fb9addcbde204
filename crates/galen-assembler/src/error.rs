//! Assembly error types

use galen_domain::ProcessingLayer;
use galen_store::StoreError;
use thiserror::Error;

/// Errors that can occur while assembling a document graph
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// The requested stage's predecessor has not completed
    #[error("Cannot run {requested} for {document_id}: {missing} has not completed")]
    StageOrder {
        /// Document id
        document_id: String,
        /// Stage that was requested
        requested: ProcessingLayer,
        /// Predecessor that is missing
        missing: ProcessingLayer,
    },

    /// Document store lookup failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration rejected by validation
    #[error("Configuration error: {0}")]
    Config(String),
}
