//! The relationship-kind registry

use crate::validate::{check_properties, check_rules};
use crate::CatalogError;
use galen_domain::{
    EntityType, RelationshipCategory, RelationshipDefinition, RelationshipInstance, Violation,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

const SEED_CATALOG: &str = include_str!("../resources/seed_catalog.toml");

#[derive(Serialize, Deserialize)]
struct CatalogFile {
    #[serde(rename = "definition", default)]
    definitions: Vec<RelationshipDefinition>,
}

/// Registry of relationship definitions
///
/// Read-mostly: lookups and validation share a read lock, registration takes
/// the write lock for the whole batch so a registration is never partially
/// visible. Definitions are handed out as `Arc`s and never mutated.
#[derive(Default)]
pub struct OntologyCatalog {
    definitions: RwLock<BTreeMap<String, Arc<RelationshipDefinition>>>,
}

impl OntologyCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog preloaded with the shipped seed relationship kinds
    pub fn with_seed() -> Result<Self, CatalogError> {
        let catalog = Self::from_toml(SEED_CATALOG)?;
        info!(definitions = catalog.len(), "Loaded seed catalog");
        Ok(catalog)
    }

    /// Build a catalog from a TOML document of `[[definition]]` tables
    pub fn from_toml(toml_str: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(toml_str)?;
        let catalog = Self::new();
        catalog.register_all(file.definitions)?;
        Ok(catalog)
    }

    /// Build a catalog from a JSON array of definitions
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<RelationshipDefinition> = serde_json::from_str(json)?;
        let catalog = Self::new();
        catalog.register_all(definitions)?;
        Ok(catalog)
    }

    /// Serialise every definition as a JSON array, ordered by type id
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let definitions: Vec<RelationshipDefinition> =
            self.list().iter().map(|d| d.as_ref().clone()).collect();
        Ok(serde_json::to_string_pretty(&definitions)?)
    }

    /// Load a catalog previously written with [`save_json`](Self::save_json)
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json(&contents)?;
        debug!(path = %path.as_ref().display(), definitions = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    /// Write every definition to `path` as JSON
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }

    /// Register a new relationship kind
    ///
    /// # Errors
    ///
    /// - `DuplicateType` if the type id is already registered; the existing
    ///   entry is left untouched
    /// - `InvalidDefinition` if the type id is blank
    pub fn register(&self, definition: RelationshipDefinition) -> Result<(), CatalogError> {
        self.register_all(vec![definition]).map(|_| ())
    }

    /// Register a batch of definitions atomically: all or none
    ///
    /// Returns the number registered.
    pub fn register_all(
        &self,
        definitions: Vec<RelationshipDefinition>,
    ) -> Result<usize, CatalogError> {
        let mut registry = self.definitions.write();

        let mut batch = HashSet::new();
        for definition in &definitions {
            if definition.type_id.trim().is_empty() {
                return Err(CatalogError::InvalidDefinition(
                    "type_id must not be empty".to_string(),
                ));
            }
            if registry.contains_key(&definition.type_id) || !batch.insert(&definition.type_id) {
                return Err(CatalogError::DuplicateType(definition.type_id.clone()));
            }
        }

        let count = definitions.len();
        for definition in definitions {
            debug!(type_id = %definition.type_id, origin = ?definition.origin, "Registered relationship type");
            registry.insert(definition.type_id.clone(), Arc::new(definition));
        }
        Ok(count)
    }

    /// Get a definition by type id
    pub fn get(&self, type_id: &str) -> Option<Arc<RelationshipDefinition>> {
        self.definitions.read().get(type_id).cloned()
    }

    /// Whether a type id is registered
    pub fn contains(&self, type_id: &str) -> bool {
        self.definitions.read().contains_key(type_id)
    }

    /// Number of registered definitions
    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All definitions, ordered by type id
    pub fn list(&self) -> Vec<Arc<RelationshipDefinition>> {
        self.definitions.read().values().cloned().collect()
    }

    /// Definitions whose source side is `domain`
    pub fn by_domain(&self, domain: EntityType) -> Vec<Arc<RelationshipDefinition>> {
        self.filter(|d| d.domain == domain)
    }

    /// Definitions whose target side is `range`
    pub fn by_range(&self, range: EntityType) -> Vec<Arc<RelationshipDefinition>> {
        self.filter(|d| d.range == range)
    }

    /// Definitions in a category
    pub fn by_category(&self, category: RelationshipCategory) -> Vec<Arc<RelationshipDefinition>> {
        self.filter(|d| d.category == category)
    }

    fn filter(
        &self,
        predicate: impl Fn(&RelationshipDefinition) -> bool,
    ) -> Vec<Arc<RelationshipDefinition>> {
        self.definitions
            .read()
            .values()
            .filter(|d| predicate(d))
            .cloned()
            .collect()
    }

    /// Check a prospective relationship against its definition
    ///
    /// Returns every violation found; an empty list means valid. Never fails
    /// and never mutates the catalog.
    pub fn validate(
        &self,
        type_id: &str,
        source_type: EntityType,
        target_type: EntityType,
        properties: &BTreeMap<String, Value>,
    ) -> Vec<Violation> {
        let Some(definition) = self.get(type_id) else {
            return vec![Violation::UnknownType {
                type_id: type_id.to_string(),
            }];
        };

        let mut violations = Vec::new();
        if source_type != definition.domain {
            violations.push(Violation::DomainMismatch {
                expected: definition.domain,
                actual: source_type,
            });
        }
        if target_type != definition.range {
            violations.push(Violation::RangeMismatch {
                expected: definition.range,
                actual: target_type,
            });
        }
        violations.extend(check_properties(&definition, properties));
        violations
    }

    /// Validate a full instance, including the definition's rules
    pub fn validate_instance(
        &self,
        instance: &RelationshipInstance,
        source_type: EntityType,
        target_type: EntityType,
    ) -> Vec<Violation> {
        let mut violations =
            self.validate(&instance.type_id, source_type, target_type, &instance.properties);
        if let Some(definition) = self.get(&instance.type_id) {
            violations.extend(check_rules(&definition, instance, source_type, target_type));
        }
        violations
    }
}
