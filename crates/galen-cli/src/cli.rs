//! CLI command definitions and argument parsing.

use clap::{ArgGroup, Args, Parser, Subcommand};
use galen_domain::{EntityType, ProcessingLayer, RelationshipCategory};
use std::path::PathBuf;

/// Galen CLI - Build and curate a provenance-anchored clinical knowledge graph.
#[derive(Debug, Parser)]
#[command(name = "galen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "GALEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// JSON format (default)
    Json,
    /// Table format
    Table,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load a guideline document into the store
    Load(LoadArgs),

    /// List stored documents
    Documents,

    /// Show a document's table of contents
    Toc {
        /// Document ID
        document: String,
    },

    /// Print a document's text or one section of it
    Content {
        /// Document ID
        document: String,
        /// Section ID (e.g. s2)
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Create a provenance anchor
    Anchor(AnchorArgs),

    /// Resolve an anchor back to its text
    Resolve {
        /// Anchor ID
        anchor: String,
    },

    /// Discover relationship candidates in a document or raw text
    Discover(DiscoverArgs),

    /// List discovered candidates
    Candidates {
        /// Only candidates with at least this confidence
        #[arg(long)]
        min_confidence: Option<f64>,
    },

    /// Generate a proposal from a candidate
    Propose {
        /// Candidate ID
        candidate: String,
    },

    /// List proposals
    Proposals {
        /// Only proposals awaiting review
        #[arg(long)]
        pending: bool,
    },

    /// Approve a proposal
    Approve {
        /// Proposal ID
        proposal: String,
        /// Reviewer name
        #[arg(short, long)]
        reviewer: String,
    },

    /// Reject a proposal
    Reject {
        /// Proposal ID
        proposal: String,
        /// Reviewer name
        #[arg(short, long)]
        reviewer: String,
        /// Reason recorded with the rejection
        #[arg(long)]
        reason: String,
    },

    /// Register an approved proposal in the catalog
    Activate {
        /// Proposal ID
        proposal: String,
        /// Register under this type id instead of the proposed name
        #[arg(long)]
        type_id: Option<String>,
    },

    /// Assemble the layered graph for a document
    Assemble {
        /// Document ID
        document: String,
        /// Run a single stage instead of all four
        #[arg(short, long, value_enum)]
        layer: Option<LayerArg>,
    },

    /// List assembled nodes of one layer
    Nodes {
        /// Document ID
        document: String,
        /// Layer to list
        #[arg(value_enum)]
        layer: LayerArg,
    },

    /// Inspect the ontology catalog
    Catalog(CatalogArgs),
}

/// Arguments for the load command.
#[derive(Debug, Args)]
pub struct LoadArgs {
    /// File to load; the extension selects the format
    pub path: PathBuf,

    /// Publisher or origin of the document (defaults to the path)
    #[arg(short, long)]
    pub source: Option<String>,

    /// Document version
    #[arg(long = "doc-version", default_value = "1")]
    pub doc_version: String,

    /// Document title (defaults to the file stem)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Extra metadata (format: key=value)
    #[arg(short, long = "meta")]
    pub meta: Vec<String>,
}

/// Arguments for the anchor command.
#[derive(Debug, Args)]
pub struct AnchorArgs {
    /// Document ID
    pub document: String,

    /// Section ID
    pub section: String,

    /// Anchored text
    pub text: String,

    /// Anchor type
    #[arg(short = 'k', long = "kind", default_value = "manual")]
    pub anchor_type: String,

    /// Byte offset in the document text (defaults to the first occurrence of the text)
    #[arg(short, long)]
    pub position: Option<usize>,

    /// Surrounding context (defaults to the anchored text)
    #[arg(long)]
    pub context: Option<String>,
}

/// Arguments for the discover command.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("input").required(true).args(["document", "text"])))]
pub struct DiscoverArgs {
    /// Stored document to scan section by section
    #[arg(short, long)]
    pub document: Option<String>,

    /// Raw text to scan
    #[arg(short, long)]
    pub text: Option<String>,

    /// Evidence source recorded for raw text
    #[arg(short, long, default_value = "cli")]
    pub source: String,
}

/// Arguments for catalog inspection.
#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Catalog action
    #[command(subcommand)]
    pub action: CatalogAction,
}

/// Catalog actions.
#[derive(Debug, Subcommand)]
pub enum CatalogAction {
    /// List definitions
    List {
        /// Filter by category
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
        /// Filter by domain entity type
        #[arg(long, value_parser = parse_entity_type)]
        domain: Option<EntityType>,
        /// Filter by range entity type
        #[arg(long, value_parser = parse_entity_type)]
        range: Option<EntityType>,
    },

    /// Show one definition
    Show {
        /// Type ID
        type_id: String,
    },

    /// Check a prospective relationship against its definition
    Validate {
        /// Type ID
        type_id: String,
        /// Source entity type
        #[arg(value_parser = parse_entity_type)]
        source_type: EntityType,
        /// Target entity type
        #[arg(value_parser = parse_entity_type)]
        target_type: EntityType,
        /// Property (format: key=json-value)
        #[arg(short, long = "property")]
        properties: Vec<String>,
    },
}

/// Processing layer argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LayerArg {
    /// Section text
    RawText,
    /// Concepts and relationships
    StructuredKnowledge,
    /// Rule envelopes
    ComputableLogic,
    /// Workflow envelopes
    ExecutableWorkflows,
}

/// Relationship category argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CategoryArg {
    /// Therapy and management
    Treatment,
    /// Diagnosis and screening
    Diagnosis,
    /// Disease mechanisms
    Pathophysiology,
    /// Risk modification
    Risk,
    /// Drug properties
    Pharmacology,
    /// Body structures
    Anatomy,
    /// Signs and symptoms
    Presentation,
    /// Ordering in time
    Temporal,
    /// Registered through governance
    Discovered,
}

fn parse_entity_type(s: &str) -> Result<EntityType, String> {
    EntityType::parse(s).ok_or_else(|| format!("unknown entity type '{}'", s))
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<LayerArg> for ProcessingLayer {
    fn from(layer: LayerArg) -> Self {
        match layer {
            LayerArg::RawText => ProcessingLayer::RawText,
            LayerArg::StructuredKnowledge => ProcessingLayer::StructuredKnowledge,
            LayerArg::ComputableLogic => ProcessingLayer::ComputableLogic,
            LayerArg::ExecutableWorkflows => ProcessingLayer::ExecutableWorkflows,
        }
    }
}

impl From<CategoryArg> for RelationshipCategory {
    fn from(category: CategoryArg) -> Self {
        match category {
            CategoryArg::Treatment => RelationshipCategory::Treatment,
            CategoryArg::Diagnosis => RelationshipCategory::Diagnosis,
            CategoryArg::Pathophysiology => RelationshipCategory::Pathophysiology,
            CategoryArg::Risk => RelationshipCategory::Risk,
            CategoryArg::Pharmacology => RelationshipCategory::Pharmacology,
            CategoryArg::Anatomy => RelationshipCategory::Anatomy,
            CategoryArg::Presentation => RelationshipCategory::Presentation,
            CategoryArg::Temporal => RelationshipCategory::Temporal,
            CategoryArg::Discovered => RelationshipCategory::Discovered,
        }
    }
}
