//! Configuration for graph assembly

use galen_domain::validity::QUESTIONABLE_THRESHOLD;
use serde::{Deserialize, Serialize};

/// Assembly configuration
///
/// # Examples
///
/// ```
/// use galen_assembler::AssemblerConfig;
///
/// let config = AssemblerConfig::from_toml(
///     "rule_engine = \"drools\"\nworkflow_engine = \"bpmn\"\nmin_confidence = 0.6",
/// )
/// .unwrap();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblerConfig {
    /// Engine tag stamped on Layer 2 rule envelopes
    /// Default: "cql"
    pub rule_engine: String,

    /// Engine tag stamped on Layer 3 workflow envelopes
    /// Default: "bpmn"
    pub workflow_engine: String,

    /// Relationships scoring below this are not assembled
    /// Default: 0.3
    pub min_confidence: f64,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            rule_engine: "cql".to_string(),
            workflow_engine: "bpmn".to_string(),
            min_confidence: QUESTIONABLE_THRESHOLD,
        }
    }
}

impl AssemblerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.rule_engine.trim().is_empty() {
            return Err("rule_engine must not be empty".to_string());
        }
        if self.workflow_engine.trim().is_empty() {
            return Err("workflow_engine must not be empty".to_string());
        }
        if !(QUESTIONABLE_THRESHOLD..=1.0).contains(&self.min_confidence) {
            return Err(format!(
                "min_confidence must be between {} and 1.0",
                QUESTIONABLE_THRESHOLD
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AssemblerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_blank_engine_rejected() {
        let config = AssemblerConfig {
            rule_engine: " ".to_string(),
            ..AssemblerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AssemblerConfig::default();
        let parsed = AssemblerConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
