//! Relationship definitions, property schemas, and validation outcomes

use crate::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Typed property schema: property key → expected value shape
pub type PropertySchema = BTreeMap<String, PropertySpec>;

/// Broad category of a relationship kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipCategory {
    /// Therapy and management
    Treatment,
    /// Diagnosis and screening
    Diagnosis,
    /// Disease mechanisms and progression
    Pathophysiology,
    /// Risk modification
    Risk,
    /// Drug properties and interactions
    Pharmacology,
    /// Body structures
    Anatomy,
    /// Signs and symptoms
    Presentation,
    /// Ordering in time
    Temporal,
    /// Mined from text and registered through governance
    Discovered,
}

impl RelationshipCategory {
    /// Get the category name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipCategory::Treatment => "treatment",
            RelationshipCategory::Diagnosis => "diagnosis",
            RelationshipCategory::Pathophysiology => "pathophysiology",
            RelationshipCategory::Risk => "risk",
            RelationshipCategory::Pharmacology => "pharmacology",
            RelationshipCategory::Anatomy => "anatomy",
            RelationshipCategory::Presentation => "presentation",
            RelationshipCategory::Temporal => "temporal",
            RelationshipCategory::Discovered => "discovered",
        }
    }
}

/// Expected shape of a property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyKind {
    /// Free text
    String,
    /// true / false
    Boolean,
    /// A number, optionally bounded (inclusive)
    Number {
        /// Lower bound
        #[serde(default)]
        min: Option<f64>,
        /// Upper bound
        #[serde(default)]
        max: Option<f64>,
    },
    /// One of a fixed set of strings
    Enum {
        /// Allowed values
        values: Vec<String>,
    },
    /// The name of an entity type
    EntityType,
}

impl PropertyKind {
    /// Short human-readable name of the kind
    pub fn describe(&self) -> String {
        match self {
            PropertyKind::String => "string".to_string(),
            PropertyKind::Boolean => "boolean".to_string(),
            PropertyKind::Number { .. } => "number".to_string(),
            PropertyKind::Enum { values } => format!("one of [{}]", values.join(", ")),
            PropertyKind::EntityType => "entity type".to_string(),
        }
    }
}

/// Schema entry for one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    /// Expected value shape
    pub kind: PropertyKind,

    /// Whether the property must be present
    #[serde(default)]
    pub required: bool,
}

impl PropertySpec {
    /// An optional property of the given kind
    pub fn optional(kind: PropertyKind) -> Self {
        Self { kind, required: false }
    }

    /// A required property of the given kind
    pub fn required(kind: PropertyKind) -> Self {
        Self { kind, required: true }
    }
}

/// A rule attached to a relationship definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationRule {
    /// Source entity must be of this type
    SourceType {
        /// Expected type
        expected: EntityType,
    },
    /// Target entity must be of this type
    TargetType {
        /// Expected type
        expected: EntityType,
    },
    /// Instances must carry supporting evidence text
    RequiresEvidence,
    /// Instances must reach this confidence
    MinConfidence {
        /// Inclusive threshold
        threshold: f64,
    },
    /// Free-text rule for human reviewers
    Custom {
        /// Rule description
        description: String,
    },
}

impl ValidationRule {
    /// Stable short name of the rule
    pub fn name(&self) -> &'static str {
        match self {
            ValidationRule::SourceType { .. } => "source_type",
            ValidationRule::TargetType { .. } => "target_type",
            ValidationRule::RequiresEvidence => "requires_evidence",
            ValidationRule::MinConfidence { .. } => "min_confidence",
            ValidationRule::Custom { .. } => "custom",
        }
    }
}

/// Where a definition came from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefinitionOrigin {
    /// Shipped with the seed catalog
    #[default]
    Seed,
    /// Registered by activating an approved proposal
    Proposal {
        /// Proposal id
        proposal_id: String,
    },
}

/// An immutable catalog entry describing a relationship kind
///
/// Definitions are never edited in place; a revision requires a new type id
/// so historical instances stay valid against their original definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipDefinition {
    /// Unique type id (e.g. "treats")
    pub type_id: String,

    /// Human-readable name
    pub name: String,

    /// What the relationship means
    pub description: String,

    /// Broad category
    pub category: RelationshipCategory,

    /// Entity type on the source side
    pub domain: EntityType,

    /// Entity type on the target side
    pub range: EntityType,

    /// Whether A→B implies B→A
    #[serde(default)]
    pub symmetric: bool,

    /// Whether A→B and B→C imply A→C
    #[serde(default)]
    pub transitive: bool,

    /// Allowed properties
    #[serde(default)]
    pub property_schema: PropertySchema,

    /// Rules instances must satisfy
    #[serde(default)]
    pub validation_rules: Vec<ValidationRule>,

    /// Worked examples
    #[serde(default)]
    pub examples: Vec<String>,

    /// Seed or proposal
    #[serde(default)]
    pub origin: DefinitionOrigin,
}

/// A single validation finding
///
/// Validation is advisory: callers decide whether to persist a flagged
/// instance with a warning or block it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum Violation {
    /// No definition with this type id
    UnknownType {
        /// Requested type id
        type_id: String,
    },
    /// Source entity type does not match the definition's domain
    DomainMismatch {
        /// Definition domain
        expected: EntityType,
        /// Supplied source type
        actual: EntityType,
    },
    /// Target entity type does not match the definition's range
    RangeMismatch {
        /// Definition range
        expected: EntityType,
        /// Supplied target type
        actual: EntityType,
    },
    /// Property not declared in the schema
    UnknownProperty {
        /// Property key
        key: String,
    },
    /// Required property absent
    MissingProperty {
        /// Property key
        key: String,
    },
    /// Value has the wrong JSON type
    TypeMismatch {
        /// Property key
        key: String,
        /// Expected kind description
        expected: String,
    },
    /// Number outside its declared bounds
    OutOfRange {
        /// Property key
        key: String,
        /// Supplied value
        value: f64,
        /// Lower bound
        min: Option<f64>,
        /// Upper bound
        max: Option<f64>,
    },
    /// Enumerated value not in the allowed set
    NotAllowed {
        /// Property key
        key: String,
        /// Supplied value
        value: String,
        /// Allowed values
        allowed: Vec<String>,
    },
    /// A definition rule was not satisfied
    RuleFailed {
        /// Rule name
        rule: String,
        /// What went wrong
        detail: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnknownType { type_id } => {
                write!(f, "unknown relationship type '{}'", type_id)
            }
            Violation::DomainMismatch { expected, actual } => {
                write!(f, "source type {} does not match domain {}", actual, expected)
            }
            Violation::RangeMismatch { expected, actual } => {
                write!(f, "target type {} does not match range {}", actual, expected)
            }
            Violation::UnknownProperty { key } => write!(f, "unknown property '{}'", key),
            Violation::MissingProperty { key } => {
                write!(f, "missing required property '{}'", key)
            }
            Violation::TypeMismatch { key, expected } => {
                write!(f, "property '{}' must be {}", key, expected)
            }
            Violation::OutOfRange { key, value, min, max } => write!(
                f,
                "property '{}' value {} outside [{}, {}]",
                key,
                value,
                min.map_or("-inf".to_string(), |m| m.to_string()),
                max.map_or("inf".to_string(), |m| m.to_string()),
            ),
            Violation::NotAllowed { key, value, allowed } => write!(
                f,
                "property '{}' value '{}' not in [{}]",
                key,
                value,
                allowed.join(", ")
            ),
            Violation::RuleFailed { rule, detail } => write!(f, "rule {} failed: {}", rule, detail),
        }
    }
}
