//! Configuration for relationship discovery

use galen_domain::validity::QUESTIONABLE_THRESHOLD;
use serde::{Deserialize, Serialize};

/// Configuration for the extractor and discovery engine
///
/// # Examples
///
/// ```
/// use galen_discovery::DiscoveryConfig;
///
/// let config = DiscoveryConfig::default();
/// assert_eq!(config.max_pair_distance, 200);
///
/// let strict = DiscoveryConfig::strict();
/// assert!(strict.min_confidence > config.min_confidence);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Maximum gap in characters between two mentions for them to pair
    /// Default: 200
    pub max_pair_distance: usize,

    /// How far outside a pair to look for an indicator phrase when none sits
    /// between the mentions
    /// Default: 60
    pub indicator_margin: usize,

    /// Bytes of text kept on each side of a pair as its context window
    /// Default: 100
    pub context_radius: usize,

    /// Candidates scoring below this are dropped
    /// Default: 0.3 (never lower)
    pub min_confidence: f64,

    /// Similarity attached to each matching catalog type
    /// Default: 0.8
    pub similarity_weight: f64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_pair_distance: 200,
            indicator_margin: 60,
            context_radius: 100,
            min_confidence: QUESTIONABLE_THRESHOLD,
            similarity_weight: 0.8,
        }
    }
}

impl DiscoveryConfig {
    /// Strict preset: tight pairing, only probable-or-better candidates
    pub fn strict() -> Self {
        Self {
            max_pair_distance: 120,
            indicator_margin: 0,
            context_radius: 100,
            min_confidence: 0.6,
            similarity_weight: 0.8,
        }
    }

    /// Lenient preset: wider pairing and context
    pub fn lenient() -> Self {
        Self {
            max_pair_distance: 300,
            indicator_margin: 100,
            context_radius: 150,
            min_confidence: QUESTIONABLE_THRESHOLD,
            similarity_weight: 0.8,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_pair_distance == 0 {
            return Err("max_pair_distance must be greater than 0".to_string());
        }
        if !(QUESTIONABLE_THRESHOLD..=1.0).contains(&self.min_confidence) {
            return Err(format!(
                "min_confidence must be between {} and 1.0",
                QUESTIONABLE_THRESHOLD
            ));
        }
        if !(self.similarity_weight > 0.0 && self.similarity_weight <= 1.0) {
            return Err("similarity_weight must be in (0.0, 1.0]".to_string());
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
