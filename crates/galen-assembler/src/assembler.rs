//! The per-document layer state machine

use crate::stages::{self, StageContext, StageOutput};
use crate::{AssemblerConfig, AssemblyError, StageReport};
use galen_catalog::OntologyCatalog;
use galen_discovery::{ContextAnalyzer, DiscoveryConfig, EntityPairExtractor, Vocabulary};
use galen_domain::{GraphNode, ProcessingLayer};
use galen_store::DocumentStore;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, warn};

/// Serializable copy of one document's assembled layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Document id
    pub document_id: String,
    /// Highest completed layer, if any
    pub completed: Option<ProcessingLayer>,
    /// Nodes of every completed layer
    pub nodes: Vec<GraphNode>,
}

#[derive(Default)]
struct DocumentGraph {
    layers: BTreeMap<ProcessingLayer, Vec<GraphNode>>,
}

impl DocumentGraph {
    fn completed(&self) -> Option<ProcessingLayer> {
        self.layers.keys().next_back().copied()
    }
}

/// Builds the four-layer graph for stored documents
///
/// Each document moves forward through
/// `RAW_TEXT → STRUCTURED_KNOWLEDGE → COMPUTABLE_LOGIC → EXECUTABLE_WORKFLOWS`.
/// A stage reads only its predecessor's nodes plus the store and catalog.
/// Re-running a stage rebuilds its node set from scratch; node ids are
/// deterministic so an unchanged document yields identical nodes.
///
/// # Examples
///
/// ```
/// use galen_assembler::{AssemblerConfig, GraphAssembler};
/// use galen_catalog::OntologyCatalog;
/// use galen_discovery::{DiscoveryConfig, Vocabulary};
/// use galen_domain::{DocumentMetadata, ProcessingLayer};
/// use galen_store::DocumentStore;
/// use std::sync::Arc;
///
/// let store = Arc::new(DocumentStore::in_memory());
/// let doc = store
///     .load("ada.md", "# Therapy\nMetformin is used to treat type 2 diabetes.", DocumentMetadata::new("ADA", "2024"))
///     .unwrap();
///
/// let assembler = GraphAssembler::new(
///     Arc::clone(&store),
///     Arc::new(OntologyCatalog::with_seed().unwrap()),
///     Arc::new(Vocabulary::clinical().unwrap()),
///     DiscoveryConfig::default(),
///     AssemblerConfig::default(),
/// )
/// .unwrap();
///
/// assembler.run_all(&doc.id).unwrap();
/// let rules = assembler.get_nodes(&doc.id, ProcessingLayer::ComputableLogic);
/// assert_eq!(rules.len(), 1);
/// ```
pub struct GraphAssembler {
    store: Arc<DocumentStore>,
    catalog: Arc<OntologyCatalog>,
    extractor: EntityPairExtractor,
    analyzer: ContextAnalyzer,
    config: AssemblerConfig,
    graphs: RwLock<HashMap<String, DocumentGraph>>,
}

impl GraphAssembler {
    /// Create an assembler
    pub fn new(
        store: Arc<DocumentStore>,
        catalog: Arc<OntologyCatalog>,
        vocabulary: Arc<Vocabulary>,
        discovery: DiscoveryConfig,
        config: AssemblerConfig,
    ) -> Result<Self, AssemblyError> {
        config.validate().map_err(AssemblyError::Config)?;
        discovery.validate().map_err(AssemblyError::Config)?;

        Ok(Self {
            store,
            catalog,
            extractor: EntityPairExtractor::new(Arc::clone(&vocabulary), discovery),
            analyzer: ContextAnalyzer::new(vocabulary),
            config,
            graphs: RwLock::new(HashMap::new()),
        })
    }

    /// The configuration in use
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Run one stage for a document
    ///
    /// # Errors
    ///
    /// - `StageOrder` if the predecessor stage has not completed
    /// - `Store` if the document is unknown
    pub fn run_stage(
        &self,
        document_id: &str,
        layer: ProcessingLayer,
    ) -> Result<StageReport, AssemblyError> {
        let input = match layer.previous() {
            None => Vec::new(),
            Some(previous) => self
                .graphs
                .read()
                .get(document_id)
                .and_then(|graph| graph.layers.get(&previous))
                .cloned()
                .ok_or_else(|| AssemblyError::StageOrder {
                    document_id: document_id.to_string(),
                    requested: layer,
                    missing: previous,
                })?,
        };

        let document = self.store.get_document(document_id)?;
        let text = self.store.get_content(document_id, None)?;
        let ctx = StageContext {
            store: &self.store,
            catalog: &self.catalog,
            extractor: &self.extractor,
            analyzer: &self.analyzer,
            config: &self.config,
            document: &document,
            text: &text,
        };

        let StageOutput { nodes, failures } = match layer {
            ProcessingLayer::RawText => stages::raw_text(&ctx),
            ProcessingLayer::StructuredKnowledge => stages::structured_knowledge(&ctx, &input),
            ProcessingLayer::ComputableLogic => stages::computable_logic(&ctx, &input),
            ProcessingLayer::ExecutableWorkflows => stages::executable_workflows(&ctx, &input),
        };

        let report = StageReport {
            document_id: document_id.to_string(),
            layer,
            nodes: nodes.len(),
            replaced: 0,
            failures,
        };

        let replaced = self
            .graphs
            .write()
            .entry(document_id.to_string())
            .or_default()
            .layers
            .insert(layer, nodes)
            .map_or(0, |old| old.len());
        let report = StageReport { replaced, ..report };

        if report.is_clean() {
            info!(document_id, layer = %layer, nodes = report.nodes, replaced, "Stage completed");
        } else {
            warn!(
                document_id,
                layer = %layer,
                nodes = report.nodes,
                failures = report.failures.len(),
                "Stage completed with failed sections"
            );
        }
        Ok(report)
    }

    /// Run every stage in order
    pub fn run_all(&self, document_id: &str) -> Result<Vec<StageReport>, AssemblyError> {
        ProcessingLayer::ALL
            .into_iter()
            .map(|layer| self.run_stage(document_id, layer))
            .collect()
    }

    /// Nodes of one layer for a document; empty if the stage has not run
    pub fn get_nodes(&self, document_id: &str, layer: ProcessingLayer) -> Vec<GraphNode> {
        self.graphs
            .read()
            .get(document_id)
            .and_then(|graph| graph.layers.get(&layer))
            .cloned()
            .unwrap_or_default()
    }

    /// Highest layer completed for a document
    pub fn completed_layer(&self, document_id: &str) -> Option<ProcessingLayer> {
        self.graphs
            .read()
            .get(document_id)
            .and_then(DocumentGraph::completed)
    }

    /// Copy of a document's assembled state
    pub fn snapshot(&self, document_id: &str) -> GraphSnapshot {
        let graphs = self.graphs.read();
        let graph = graphs.get(document_id);
        GraphSnapshot {
            document_id: document_id.to_string(),
            completed: graph.and_then(DocumentGraph::completed),
            nodes: graph
                .map(|g| g.layers.values().flatten().cloned().collect())
                .unwrap_or_default(),
        }
    }

    /// Replace a document's assembled state from a snapshot
    pub fn restore(&self, snapshot: GraphSnapshot) {
        let mut graph = DocumentGraph::default();
        if let Some(completed) = snapshot.completed {
            for layer in ProcessingLayer::ALL.into_iter().filter(|l| *l <= completed) {
                graph.layers.insert(layer, Vec::new());
            }
        }
        for node in snapshot.nodes {
            if let Some(nodes) = graph.layers.get_mut(&node.processing_layer) {
                nodes.push(node);
            }
        }
        self.graphs.write().insert(snapshot.document_id, graph);
    }
}
