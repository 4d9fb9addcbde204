//! Store configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a [`crate::DocumentStore`]
///
/// # Examples
///
/// ```
/// use galen_store::StoreConfig;
///
/// let config = StoreConfig::default();
/// assert_eq!(config.context_radius, 200);
/// assert!(config.root.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Characters of document text on each side of an anchor position
    /// returned in a resolution's context window
    /// Default: 200
    pub context_radius: usize,

    /// Persistence root; `None` keeps everything in memory
    #[serde(default)]
    pub root: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            context_radius: 200,
            root: None,
        }
    }
}

impl StoreConfig {
    /// Persist under `root`
    pub fn persistent(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    /// Set the context window radius
    pub fn with_context_radius(mut self, radius: usize) -> Self {
        self.context_radius = radius;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.context_radius == 0 {
            return Err("context_radius must be greater than 0".to_string());
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
    fn test_default_config_is_valid() {
        assert!(StoreConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_radius_rejected() {
        let config = StoreConfig::default().with_context_radius(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = StoreConfig::persistent("/var/lib/galen").with_context_radius(80);
        let toml_str = config.to_toml().unwrap();
        let parsed = StoreConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults_for_root() {
        let parsed = StoreConfig::from_toml("context_radius = 50").unwrap();
        assert_eq!(parsed.context_radius, 50);
        assert!(parsed.root.is_none());
    }
}
