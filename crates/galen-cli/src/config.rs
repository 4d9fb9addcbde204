//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use galen_assembler::AssemblerConfig;
use galen_discovery::DiscoveryConfig;
use galen_governance::GovernanceConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "galen.toml";

/// CLI configuration, read from `galen.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding documents, candidates, proposals, catalog, and graphs
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Vocabulary table overriding the shipped one
    #[serde(default)]
    pub vocabulary: Option<PathBuf>,

    /// Anchor context window radius
    #[serde(default = "default_context_radius")]
    pub context_radius: usize,

    /// Output settings
    #[serde(default)]
    pub settings: Settings,

    /// Discovery tuning
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Proposal generation
    #[serde(default)]
    pub governance: GovernanceConfig,

    /// Graph assembly
    #[serde(default)]
    pub assembler: AssemblerConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty JSON
    Json,
    /// Table format
    Table,
    /// Quiet (ids only)
    Quiet,
}

impl Config {
    /// Default per-user configuration path.
    pub fn user_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".galen").join(CONFIG_FILE))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise `./galen.toml`, then
    /// `~/.galen/galen.toml`, then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(CliError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )))
            }
            Some(path) => Some(path.to_path_buf()),
            None => [Some(PathBuf::from(CONFIG_FILE)), Self::user_path()]
                .into_iter()
                .flatten()
                .find(|p| p.exists()),
        };

        let config = match path {
            Some(path) => Self::from_toml(&fs::read_to_string(&path)?)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Serialize configuration to TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        if self.context_radius == 0 {
            return Err(CliError::Config("context_radius must be greater than 0".into()));
        }
        self.discovery.validate().map_err(CliError::Config)?;
        self.governance.validate().map_err(CliError::Config)?;
        self.assembler.validate().map_err(CliError::Config)?;
        Ok(())
    }

    /// Root of the document store.
    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join("documents")
    }

    /// Exported candidate list.
    pub fn candidates_path(&self) -> PathBuf {
        self.data_dir.join("candidates.json")
    }

    /// Exported proposal list.
    pub fn proposals_path(&self) -> PathBuf {
        self.data_dir.join("proposals.json")
    }

    /// Persisted catalog.
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join("catalog.json")
    }

    /// Assembled graph snapshot for a document.
    pub fn graph_path(&self, document_id: &str) -> PathBuf {
        self.data_dir.join("graphs").join(format!("{}.json", document_id))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            vocabulary: None,
            context_radius: default_context_radius(),
            settings: Settings::default(),
            discovery: DiscoveryConfig::default(),
            governance: GovernanceConfig::default(),
            assembler: AssemblerConfig::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Json,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("galen"))
        .unwrap_or_else(|| PathBuf::from(".galen"))
}

fn default_context_radius() -> usize {
    200
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Json
}
