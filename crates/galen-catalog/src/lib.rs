//! Galen Ontology Catalog
//!
//! The registry of relationship kinds the knowledge graph may use. Each kind
//! is an immutable [`galen_domain::RelationshipDefinition`] with a domain,
//! range, typed property schema, and validation rules.
//!
//! # Overview
//!
//! - Lookups (`get`, `by_domain`, `by_range`, `by_category`) are pure reads
//! - `register` / `register_all` are serialised and all-or-nothing
//! - `validate` is advisory: it returns violations and never fails
//!
//! # Examples
//!
//! ```
//! use galen_catalog::OntologyCatalog;
//! use galen_domain::EntityType;
//! use std::collections::BTreeMap;
//!
//! let catalog = OntologyCatalog::with_seed().unwrap();
//! let violations = catalog.validate(
//!     "treats",
//!     EntityType::Medication,
//!     EntityType::Condition,
//!     &BTreeMap::new(),
//! );
//! assert!(violations.is_empty());
//! ```

#![warn(missing_docs)]

mod catalog;
mod error;
mod validate;

pub use catalog::OntologyCatalog;
pub use error::CatalogError;
pub use validate::{check_properties, check_rules};
