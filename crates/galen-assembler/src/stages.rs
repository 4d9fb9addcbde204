//! Node builders for each processing layer

use crate::AssemblerConfig;
use galen_catalog::OntologyCatalog;
use galen_discovery::{ContextAnalyzer, EntityPair, EntityPairExtractor, Mention, SectionFailure};
use galen_domain::hashing::stable_id;
use galen_domain::{
    Concept, Document, GraphNode, NodePayload, ProcessingLayer, RelationshipDefinition,
    RelationshipInstance, RuleEnvelope, Section, WorkflowEnvelope,
};
use galen_store::DocumentStore;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a stage may read
pub(crate) struct StageContext<'a> {
    pub store: &'a DocumentStore,
    pub catalog: &'a OntologyCatalog,
    pub extractor: &'a EntityPairExtractor,
    pub analyzer: &'a ContextAnalyzer,
    pub config: &'a AssemblerConfig,
    pub document: &'a Document,
    pub text: &'a str,
}

#[derive(Default)]
pub(crate) struct StageOutput {
    pub nodes: Vec<GraphNode>,
    pub failures: Vec<SectionFailure>,
}

/// Deterministic node id from the document, layer, and identifying parts
pub(crate) fn node_id(document_id: &str, layer: ProcessingLayer, parts: &[&str]) -> String {
    let mut all = vec![document_id, layer.as_str()];
    all.extend_from_slice(parts);
    stable_id("node", &all)
}

/// Byte offset of a section's own body inside the document text
///
/// The search starts past the heading line so a body that repeats the
/// heading words resolves to the body.
fn body_offset(text: &str, section: &Section) -> usize {
    let from = section.body_start.clamp(section.span.start, section.span.end);
    text.get(from..section.span.end)
        .and_then(|body| body.find(&section.content))
        .map_or(from, |offset| from + offset)
}

/// Text and position a Layer-0 anchor quotes: the heading line as written,
/// else the first line of the body
fn heading_anchor<'t>(text: &'t str, section: &'t Section) -> (&'t str, usize) {
    let heading = text
        .get(section.span.start..section.body_start)
        .map(str::trim)
        .unwrap_or_default();
    if !heading.is_empty() {
        let line = &text[section.span.start..section.body_start];
        let indent = line.len() - line.trim_start().len();
        return (heading, section.span.start + indent);
    }

    let first_line = section.content.lines().next().map_or("", str::trim_end);
    (first_line, body_offset(text, section))
}

/// Layer 0: one node per section, anchored on its heading
pub(crate) fn raw_text(ctx: &StageContext<'_>) -> StageOutput {
    let document_id = &ctx.document.id;
    let mut output = StageOutput::default();

    for section in &ctx.document.sections {
        let (anchor_text, position) = heading_anchor(ctx.text, section);
        let anchor = ctx.store.create_anchor(
            document_id,
            &section.id,
            anchor_text,
            "section",
            position,
            &section.content,
        );
        match anchor {
            Ok(anchor_id) => output.nodes.push(GraphNode {
                id: node_id(document_id, ProcessingLayer::RawText, &[section.id.as_str()]),
                processing_layer: ProcessingLayer::RawText,
                document_id: document_id.clone(),
                section_id: section.id.clone(),
                anchor_ids: vec![anchor_id],
                derived_from: Vec::new(),
                payload: NodePayload::SectionText {
                    title: section.title.clone(),
                    level: section.level,
                    span: section.span,
                },
            }),
            Err(e) => output.failures.push(SectionFailure {
                section_id: section.id.clone(),
                error: e.to_string(),
            }),
        }
    }
    output
}

/// Layer 1: concepts and typed relationships mined from each section
pub(crate) fn structured_knowledge(ctx: &StageContext<'_>, sections: &[GraphNode]) -> StageOutput {
    let results: Vec<(String, Result<Vec<GraphNode>, String>)> = sections
        .par_iter()
        .map(|node| (node.section_id.clone(), section_knowledge(ctx, node)))
        .collect();

    let mut output = StageOutput::default();
    for (section_id, result) in results {
        match result {
            Ok(nodes) => output.nodes.extend(nodes),
            Err(error) => {
                warn!(document_id = %ctx.document.id, section_id = %section_id, error = %error, "Section assembly failed");
                output.failures.push(SectionFailure { section_id, error });
            }
        }
    }
    output
}

fn section_knowledge(ctx: &StageContext<'_>, section_node: &GraphNode) -> Result<Vec<GraphNode>, String> {
    let document_id = &ctx.document.id;
    let section = ctx
        .document
        .section(&section_node.section_id)
        .ok_or_else(|| format!("section {} no longer exists", section_node.section_id))?;
    if section.content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let base = body_offset(ctx.text, section);
    let mut builder = SectionBuilder {
        ctx,
        section,
        section_node,
        base,
        concepts: BTreeMap::new(),
        relationships: BTreeMap::new(),
    };

    for pair in ctx.extractor.extract_pairs(&section.content) {
        let assessment = ctx.analyzer.assess(&pair);
        if assessment.confidence < ctx.config.min_confidence {
            continue;
        }
        let Some(definition) = resolve_type(ctx, &pair) else {
            debug!(
                document_id = %document_id,
                section_id = %section.id,
                class = %pair.relationship_class,
                "No catalog type for relationship class"
            );
            continue;
        };
        builder.add(&pair, &definition, assessment.confidence)?;
    }

    Ok(builder.finish())
}

/// Catalog type for a pair: the first similar type whose domain and range
/// match the mention types, else the first similar type present at all
fn resolve_type(ctx: &StageContext<'_>, pair: &EntityPair) -> Option<Arc<RelationshipDefinition>> {
    let class = ctx.extractor.vocabulary().class(&pair.relationship_class)?;
    let present: Vec<Arc<RelationshipDefinition>> = class
        .similar_types
        .iter()
        .filter_map(|type_id| ctx.catalog.get(type_id))
        .collect();

    present
        .iter()
        .find(|d| d.domain == pair.source.entity_type && d.range == pair.target.entity_type)
        .or_else(|| present.first())
        .cloned()
}

struct SectionBuilder<'a, 'c> {
    ctx: &'a StageContext<'c>,
    section: &'a Section,
    section_node: &'a GraphNode,
    base: usize,
    concepts: BTreeMap<String, GraphNode>,
    relationships: BTreeMap<String, GraphNode>,
}

impl SectionBuilder<'_, '_> {
    fn add(
        &mut self,
        pair: &EntityPair,
        definition: &RelationshipDefinition,
        confidence: f64,
    ) -> Result<(), String> {
        let (source_id, source_anchor) = self.concept(&pair.source, &pair.context, confidence)?;
        let (target_id, target_anchor) = self.concept(&pair.target, &pair.context, confidence)?;

        let document_id = &self.ctx.document.id;
        let id = node_id(
            document_id,
            ProcessingLayer::StructuredKnowledge,
            &[
                self.section.id.as_str(),
                "relationship",
                definition.type_id.as_str(),
                source_id.as_str(),
                target_id.as_str(),
            ],
        );
        if self.relationships.contains_key(&id) {
            return Ok(());
        }

        let position = self.base + pair.source.start.min(pair.target.start);
        let anchor_id = self
            .ctx
            .store
            .create_anchor(document_id, &self.section.id, &pair.context, "relationship", position, &pair.context)
            .map_err(|e| e.to_string())?;

        let mut instance = RelationshipInstance {
            id: id.clone(),
            type_id: definition.type_id.clone(),
            source_concept: source_id,
            target_concept: target_id,
            properties: BTreeMap::new(),
            confidence,
            evidence_text: pair.context.clone(),
            anchor_id: anchor_id.clone(),
            warnings: Vec::new(),
        };
        instance.warnings = self.ctx.catalog.validate_instance(
            &instance,
            pair.source.entity_type,
            pair.target.entity_type,
        );
        if !instance.warnings.is_empty() {
            warn!(
                document_id = %document_id,
                section_id = %self.section.id,
                type_id = %definition.type_id,
                violations = instance.warnings.len(),
                "Relationship kept with advisory violations"
            );
        }

        let mut anchor_ids = vec![anchor_id, source_anchor, target_anchor];
        anchor_ids.dedup();
        self.relationships.insert(
            id.clone(),
            GraphNode {
                id,
                processing_layer: ProcessingLayer::StructuredKnowledge,
                document_id: document_id.clone(),
                section_id: self.section.id.clone(),
                anchor_ids,
                derived_from: vec![self.section_node.id.clone()],
                payload: NodePayload::Relationship(instance),
            },
        );
        Ok(())
    }

    /// Concept node for a mention, created on first sight; returns its id
    /// and anchor id
    fn concept(&mut self, mention: &Mention, context: &str, confidence: f64) -> Result<(String, String), String> {
        let key = mention.text.to_lowercase();
        if let Some(node) = self.concepts.get_mut(&key) {
            if let NodePayload::Concept(concept) = &mut node.payload {
                concept.confidence = concept.confidence.max(confidence);
                return Ok((concept.id.clone(), concept.anchor_id.clone()));
            }
        }

        let document_id = &self.ctx.document.id;
        let anchor_id = self
            .ctx
            .store
            .create_anchor(
                document_id,
                &self.section.id,
                &mention.text,
                "concept",
                self.base + mention.start,
                context,
            )
            .map_err(|e| e.to_string())?;

        let id = node_id(
            document_id,
            ProcessingLayer::StructuredKnowledge,
            &[self.section.id.as_str(), "concept", key.as_str()],
        );
        self.concepts.insert(
            key,
            GraphNode {
                id: id.clone(),
                processing_layer: ProcessingLayer::StructuredKnowledge,
                document_id: document_id.clone(),
                section_id: self.section.id.clone(),
                anchor_ids: vec![anchor_id.clone()],
                derived_from: vec![self.section_node.id.clone()],
                payload: NodePayload::Concept(Concept {
                    id: id.clone(),
                    name: mention.text.clone(),
                    entity_type: mention.entity_type,
                    confidence,
                    anchor_id: anchor_id.clone(),
                }),
            },
        );
        Ok((id, anchor_id))
    }

    fn finish(self) -> Vec<GraphNode> {
        self.concepts
            .into_values()
            .chain(self.relationships.into_values())
            .collect()
    }
}

/// Layer 2: a placeholder rule envelope per relationship
pub(crate) fn computable_logic(ctx: &StageContext<'_>, knowledge: &[GraphNode]) -> StageOutput {
    let nodes = knowledge
        .iter()
        .filter(|node| matches!(node.payload, NodePayload::Relationship(_)))
        .map(|relationship| GraphNode {
            id: node_id(&ctx.document.id, ProcessingLayer::ComputableLogic, &[relationship.id.as_str()]),
            processing_layer: ProcessingLayer::ComputableLogic,
            document_id: ctx.document.id.clone(),
            section_id: relationship.section_id.clone(),
            anchor_ids: relationship.anchor_ids.clone(),
            derived_from: vec![relationship.id.clone()],
            payload: NodePayload::Rule(RuleEnvelope {
                engine: ctx.config.rule_engine.clone(),
                source_relationship: relationship.id.clone(),
                body: None,
            }),
        })
        .collect();

    StageOutput {
        nodes,
        failures: Vec::new(),
    }
}

/// Layer 3: one placeholder workflow envelope per section with rules
pub(crate) fn executable_workflows(ctx: &StageContext<'_>, rules: &[GraphNode]) -> StageOutput {
    let mut by_section: BTreeMap<&str, Vec<&GraphNode>> = BTreeMap::new();
    for rule in rules {
        by_section.entry(rule.section_id.as_str()).or_default().push(rule);
    }

    let nodes = by_section
        .into_iter()
        .map(|(section_id, rules)| {
            let mut anchor_ids: Vec<String> = Vec::new();
            for rule in &rules {
                for anchor_id in &rule.anchor_ids {
                    if !anchor_ids.contains(anchor_id) {
                        anchor_ids.push(anchor_id.clone());
                    }
                }
            }
            let rule_ids: Vec<String> = rules.iter().map(|r| r.id.clone()).collect();

            GraphNode {
                id: node_id(&ctx.document.id, ProcessingLayer::ExecutableWorkflows, &[section_id]),
                processing_layer: ProcessingLayer::ExecutableWorkflows,
                document_id: ctx.document.id.clone(),
                section_id: section_id.to_string(),
                anchor_ids,
                derived_from: rule_ids.clone(),
                payload: NodePayload::Workflow(WorkflowEnvelope {
                    engine: ctx.config.workflow_engine.clone(),
                    rule_ids,
                    body: None,
                }),
            }
        })
        .collect();

    StageOutput {
        nodes,
        failures: Vec::new(),
    }
}
