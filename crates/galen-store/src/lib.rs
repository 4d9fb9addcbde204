//! Galen Document Store
//!
//! Loads guideline documents, splits them into a heading-derived section
//! tree, and anchors derived knowledge back to exact source text.
//!
//! # Architecture
//!
//! - `format`: per-format text extraction (plain, HTML, PDF text, XML)
//! - `sections`: heading heuristics and stack-based nesting
//! - `store`: the thread-safe [`DocumentStore`] with anchor creation and resolution
//! - `persist`: the one-directory-per-document durability layout
//!
//! # Examples
//!
//! ```
//! use galen_domain::DocumentMetadata;
//! use galen_store::DocumentStore;
//!
//! let store = DocumentStore::in_memory();
//! let doc = store
//!     .load("htn.md", "# Hypertension\nUse ACE inhibitors.", DocumentMetadata::new("NICE", "2024"))
//!     .unwrap();
//! let anchor_id = store
//!     .create_anchor(&doc.id, "s1", "ACE inhibitors", "recommendation", 19, "")
//!     .unwrap();
//! let resolution = store.resolve_anchor(&anchor_id).unwrap();
//! assert_eq!(resolution.anchor.text, "ACE inhibitors");
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod format;
mod persist;
mod sections;
mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use format::extract_text;
pub use sections::{build_sections, detect_heading};
pub use store::DocumentStore;
