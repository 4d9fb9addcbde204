//! Catalog inspection commands.

use super::parse_pair;
use crate::cli::CatalogAction;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::workspace::Workspace;
use galen_domain::RelationshipCategory;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Execute a catalog action.
pub fn execute_catalog(
    action: CatalogAction,
    workspace: &Workspace,
    formatter: &Formatter,
) -> Result<String> {
    match action {
        CatalogAction::List {
            category,
            domain,
            range,
        } => {
            let category: Option<RelationshipCategory> = category.map(Into::into);
            let definitions: Vec<_> = workspace
                .catalog
                .list()
                .into_iter()
                .filter(|d| category.is_none_or(|c| d.category == c))
                .filter(|d| domain.is_none_or(|t| d.domain == t))
                .filter(|d| range.is_none_or(|t| d.range == t))
                .collect();
            formatter.format_definitions(&definitions)
        }
        CatalogAction::Show { type_id } => {
            let definition = workspace.catalog.get(&type_id).ok_or_else(|| {
                CliError::InvalidInput(format!("Unknown relationship type: {}", type_id))
            })?;
            formatter.format_value(definition.as_ref(), &definition.type_id)
        }
        CatalogAction::Validate {
            type_id,
            source_type,
            target_type,
            properties,
        } => {
            let properties = parse_properties(&properties)?;
            let violations = workspace
                .catalog
                .validate(&type_id, source_type, target_type, &properties);
            let valid = violations.is_empty();
            let result = json!({
                "type_id": type_id,
                "valid": valid,
                "violations": violations,
            });
            formatter.format_value(&result, if valid { "valid" } else { "invalid" })
        }
    }
}

/// `key=value` pairs; values are read as JSON, falling back to a plain string.
fn parse_properties(pairs: &[String]) -> Result<BTreeMap<String, Value>> {
    pairs
        .iter()
        .map(|pair| {
            let (key, raw) = parse_pair(pair)?;
            let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            Ok((key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_properties() {
        let properties = parse_properties(&[
            "dose_mg=500".to_string(),
            "route=oral".to_string(),
            "first_line=true".to_string(),
        ])
        .unwrap();
        assert_eq!(properties["dose_mg"], json!(500));
        assert_eq!(properties["route"], json!("oral"));
        assert_eq!(properties["first_line"], json!(true));
    }
}
