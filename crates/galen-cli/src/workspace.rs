//! On-disk state shared by every command.
//!
//! ```text
//! <data_dir>/
//!   documents/          document store root
//!   catalog.json        catalog, seeded on first use
//!   candidates.json     discovered candidates
//!   proposals.json      governance proposals
//!   graphs/<doc>.json   assembled layers per document
//! ```

use crate::config::Config;
use crate::error::Result;
use galen_assembler::{GraphAssembler, GraphSnapshot};
use galen_catalog::OntologyCatalog;
use galen_discovery::{RelationshipDiscoveryEngine, Vocabulary};
use galen_governance::ProposalManager;
use galen_store::{DocumentStore, StoreConfig};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Store, catalog, engine, and proposal registry opened from a data directory.
pub struct Workspace {
    config: Config,
    /// Document store
    pub store: Arc<DocumentStore>,
    /// Ontology catalog
    pub catalog: Arc<OntologyCatalog>,
    /// Vocabulary table
    pub vocabulary: Arc<Vocabulary>,
    /// Discovery engine with persisted candidates loaded
    pub engine: RelationshipDiscoveryEngine,
    /// Proposal manager with persisted proposals loaded
    pub proposals: ProposalManager,
}

impl Workspace {
    /// Open (or initialize) the workspace under `config.data_dir`.
    pub fn open(config: &Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let store = Arc::new(DocumentStore::new(
            StoreConfig::persistent(config.documents_dir())
                .with_context_radius(config.context_radius),
        )?);

        let catalog_path = config.catalog_path();
        let catalog = if catalog_path.exists() {
            OntologyCatalog::load_json(&catalog_path)?
        } else {
            OntologyCatalog::with_seed()?
        };
        let catalog = Arc::new(catalog);

        let vocabulary = Arc::new(match &config.vocabulary {
            Some(path) => Vocabulary::from_file(path)?,
            None => Vocabulary::clinical()?,
        });

        let engine = RelationshipDiscoveryEngine::new(
            Arc::clone(&vocabulary),
            Arc::clone(&catalog),
            config.discovery.clone(),
        )?;
        if let Some(json) = read_optional(&config.candidates_path())? {
            let imported = engine.import_candidates(&json)?;
            debug!(imported, "Loaded candidates");
        }

        let proposals = ProposalManager::new(Arc::clone(&vocabulary), config.governance.clone())?;
        if let Some(json) = read_optional(&config.proposals_path())? {
            let imported = proposals.import_proposals(&json)?;
            debug!(imported, "Loaded proposals");
        }

        Ok(Self {
            config: config.clone(),
            store,
            catalog,
            vocabulary,
            engine,
            proposals,
        })
    }

    /// Configuration the workspace was opened with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Persist the candidate list.
    pub fn save_candidates(&self) -> Result<()> {
        fs::write(self.config.candidates_path(), self.engine.export_candidates()?)?;
        Ok(())
    }

    /// Persist the proposal registry.
    pub fn save_proposals(&self) -> Result<()> {
        fs::write(self.config.proposals_path(), self.proposals.export_proposals()?)?;
        Ok(())
    }

    /// Persist the catalog.
    pub fn save_catalog(&self) -> Result<()> {
        self.catalog.save_json(self.config.catalog_path())?;
        Ok(())
    }

    /// Graph assembler with any previously assembled layers of `document_id` restored.
    pub fn assembler(&self, document_id: &str) -> Result<GraphAssembler> {
        let assembler = GraphAssembler::new(
            Arc::clone(&self.store),
            Arc::clone(&self.catalog),
            Arc::clone(&self.vocabulary),
            self.config.discovery.clone(),
            self.config.assembler.clone(),
        )?;
        if let Some(json) = read_optional(&self.config.graph_path(document_id))? {
            let snapshot: GraphSnapshot = serde_json::from_str(&json)?;
            assembler.restore(snapshot);
        }
        Ok(assembler)
    }

    /// Persist the assembled layers of `document_id`.
    pub fn save_graph(&self, assembler: &GraphAssembler, document_id: &str) -> Result<()> {
        let path = self.config.graph_path(document_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let snapshot = assembler.snapshot(document_id);
        fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    if path.exists() {
        Ok(Some(fs::read_to_string(path)?))
    } else {
        Ok(None)
    }
}
