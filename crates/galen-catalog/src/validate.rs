//! Property and rule checks against a relationship definition

use galen_domain::{
    EntityType, PropertyKind, RelationshipDefinition, RelationshipInstance, ValidationRule,
    Violation,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Check instance properties against a definition's schema
///
/// Reports unknown keys, missing required keys, wrong JSON types, numbers
/// outside their bounds, and enumerated values outside the allowed set.
pub fn check_properties(
    definition: &RelationshipDefinition,
    properties: &BTreeMap<String, Value>,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (key, value) in properties {
        let Some(spec) = definition.property_schema.get(key) else {
            violations.push(Violation::UnknownProperty { key: key.clone() });
            continue;
        };
        if let Some(violation) = check_value(key, &spec.kind, value) {
            violations.push(violation);
        }
    }

    for (key, spec) in &definition.property_schema {
        if spec.required && !properties.contains_key(key) {
            violations.push(Violation::MissingProperty { key: key.clone() });
        }
    }

    violations
}

fn check_value(key: &str, kind: &PropertyKind, value: &Value) -> Option<Violation> {
    let mismatch = || Violation::TypeMismatch {
        key: key.to_string(),
        expected: kind.describe(),
    };

    match kind {
        PropertyKind::String => (!value.is_string()).then(mismatch),
        PropertyKind::Boolean => (!value.is_boolean()).then(mismatch),
        PropertyKind::Number { min, max } => {
            let Some(number) = value.as_f64() else {
                return Some(mismatch());
            };
            let below = min.is_some_and(|m| number < m);
            let above = max.is_some_and(|m| number > m);
            (below || above).then(|| Violation::OutOfRange {
                key: key.to_string(),
                value: number,
                min: *min,
                max: *max,
            })
        }
        PropertyKind::Enum { values } => {
            let Some(s) = value.as_str() else {
                return Some(mismatch());
            };
            (!values.iter().any(|v| v == s)).then(|| Violation::NotAllowed {
                key: key.to_string(),
                value: s.to_string(),
                allowed: values.clone(),
            })
        }
        PropertyKind::EntityType => match value.as_str() {
            Some(s) if EntityType::parse(s).is_some() => None,
            _ => Some(mismatch()),
        },
    }
}

/// Evaluate a definition's validation rules against an instance
///
/// Type rules that merely restate the definition's domain or range are
/// skipped; the domain and range checks already cover them. Custom rules are
/// for human reviewers and are not evaluated.
pub fn check_rules(
    definition: &RelationshipDefinition,
    instance: &RelationshipInstance,
    source_type: EntityType,
    target_type: EntityType,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for rule in &definition.validation_rules {
        let detail = match rule {
            ValidationRule::SourceType { expected }
                if *expected != definition.domain && *expected != source_type =>
            {
                Some(format!("source is {}, expected {}", source_type, expected))
            }
            ValidationRule::TargetType { expected }
                if *expected != definition.range && *expected != target_type =>
            {
                Some(format!("target is {}, expected {}", target_type, expected))
            }
            ValidationRule::RequiresEvidence if instance.evidence_text.trim().is_empty() => {
                Some("no supporting evidence text".to_string())
            }
            ValidationRule::MinConfidence { threshold } if instance.confidence < *threshold => {
                Some(format!(
                    "confidence {:.2} below threshold {:.2}",
                    instance.confidence, threshold
                ))
            }
            _ => None,
        };

        if let Some(detail) = detail {
            violations.push(Violation::RuleFailed {
                rule: rule.name().to_string(),
                detail,
            });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use galen_domain::{DefinitionOrigin, PropertySchema, PropertySpec, RelationshipCategory};
    use serde_json::json;

    fn definition() -> RelationshipDefinition {
        let mut schema = PropertySchema::new();
        schema.insert(
            "sensitivity".to_string(),
            PropertySpec::optional(PropertyKind::Number { min: Some(0.0), max: Some(1.0) }),
        );
        schema.insert(
            "setting".to_string(),
            PropertySpec::required(PropertyKind::Enum {
                values: vec!["primary".to_string(), "secondary".to_string()],
            }),
        );
        schema.insert("note".to_string(), PropertySpec::optional(PropertyKind::String));

        RelationshipDefinition {
            type_id: "diagnoses".to_string(),
            name: "Diagnoses".to_string(),
            description: String::new(),
            category: RelationshipCategory::Diagnosis,
            domain: EntityType::Test,
            range: EntityType::Condition,
            symmetric: false,
            transitive: false,
            property_schema: schema,
            validation_rules: vec![
                ValidationRule::RequiresEvidence,
                ValidationRule::MinConfidence { threshold: 0.6 },
                ValidationRule::Custom { description: "cite the trial".to_string() },
            ],
            examples: vec![],
            origin: DefinitionOrigin::Seed,
        }
    }

    fn props(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_valid_properties() {
        let p = props(&[("sensitivity", json!(0.92)), ("setting", json!("primary"))]);
        assert!(check_properties(&definition(), &p).is_empty());
    }

    #[test]
    fn test_property_violations() {
        let p = props(&[
            ("sensitivity", json!(1.5)),
            ("note", json!(3)),
            ("colour", json!("red")),
        ]);
        let violations = check_properties(&definition(), &p);

        assert!(violations.contains(&Violation::UnknownProperty { key: "colour".to_string() }));
        assert!(violations.contains(&Violation::MissingProperty { key: "setting".to_string() }));
        assert!(violations.iter().any(|v| matches!(v, Violation::OutOfRange { key, .. } if key == "sensitivity")));
        assert!(violations.iter().any(|v| matches!(v, Violation::TypeMismatch { key, .. } if key == "note")));
        assert_eq!(violations.len(), 4);
    }

    #[test]
    fn test_enum_not_allowed() {
        let p = props(&[("setting", json!("tertiary"))]);
        let violations = check_properties(&definition(), &p);
        assert!(matches!(&violations[0], Violation::NotAllowed { value, .. } if value == "tertiary"));
    }

    #[test]
    fn test_rules() {
        let instance = RelationshipInstance {
            id: "rel_1".to_string(),
            type_id: "diagnoses".to_string(),
            source_concept: "c1".to_string(),
            target_concept: "c2".to_string(),
            properties: BTreeMap::new(),
            confidence: 0.4,
            evidence_text: "   ".to_string(),
            anchor_id: "anc_1".to_string(),
            warnings: vec![],
        };
        let violations = check_rules(&definition(), &instance, EntityType::Test, EntityType::Condition);
        let rules: Vec<&str> = violations
            .iter()
            .filter_map(|v| match v {
                Violation::RuleFailed { rule, .. } => Some(rule.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(rules, vec!["requires_evidence", "min_confidence"]);
    }
}
