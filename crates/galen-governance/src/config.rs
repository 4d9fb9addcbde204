//! Configuration for proposal generation

use galen_domain::validity::PROBABLE_THRESHOLD;
use serde::{Deserialize, Serialize};

/// Governance configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Threshold written into each proposal's confidence rule
    /// Default: 0.6
    pub min_confidence: f64,

    /// Whether proposals carry the requires-evidence rule
    /// Default: true
    pub require_evidence: bool,

    /// Maximum worked examples copied into a proposal
    /// Default: 3
    pub max_examples: usize,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            min_confidence: PROBABLE_THRESHOLD,
            require_evidence: true,
            max_examples: 3,
        }
    }
}

impl GovernanceConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err("min_confidence must be between 0.0 and 1.0".to_string());
        }
        if self.max_examples == 0 {
            return Err("max_examples must be greater than 0".to_string());
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
