//! The data-driven clinical vocabulary
//!
//! One table drives extraction and scoring: entity keywords and patterns,
//! relationship classes with their indicator phrases and catalog mappings,
//! evidence phrase tiers, clinical relevance keywords, and the type-pairing
//! consistency table. The shipped table lives in `resources/vocabulary.toml`.

use crate::VocabularyError;
use galen_domain::{EntityType, PropertySchema};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_VOCABULARY: &str = include_str!("../resources/vocabulary.toml");

#[derive(Deserialize)]
struct VocabularyFile {
    #[serde(default)]
    entities: Vec<EntitySpec>,
    #[serde(default)]
    classes: Vec<ClassSpec>,
    evidence: EvidenceSpec,
    #[serde(default)]
    clinical_keywords: Vec<String>,
    #[serde(default)]
    consistency: Vec<ConsistencySpec>,
    default_consistency: f64,
}

#[derive(Deserialize)]
struct EntitySpec {
    entity_type: EntityType,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    patterns: Vec<String>,
}

#[derive(Deserialize)]
struct ClassSpec {
    name: String,
    #[serde(default)]
    intervention_source: bool,
    indicators: Vec<String>,
    #[serde(default)]
    similar_types: Vec<String>,
    name_template: String,
    description_template: String,
    #[serde(default)]
    property_schema: PropertySchema,
}

#[derive(Deserialize)]
struct EvidenceSpec {
    default_score: f64,
    #[serde(default)]
    tiers: Vec<EvidenceTierSpec>,
}

#[derive(Deserialize)]
struct EvidenceTierSpec {
    name: String,
    score: f64,
    phrases: Vec<String>,
}

#[derive(Deserialize)]
struct ConsistencySpec {
    class: String,
    source: EntityType,
    target: EntityType,
    score: f64,
}

/// Compiled matchers for one entity type
#[derive(Debug)]
pub struct EntityMatcher {
    /// The type these matchers produce
    pub entity_type: EntityType,
    keywords: Vec<String>,
    keyword_matcher: Option<Regex>,
    patterns: Vec<Regex>,
}

impl EntityMatcher {
    /// Keyword matcher (longest alternative first), if any keywords exist
    pub fn keyword_matcher(&self) -> Option<&Regex> {
        self.keyword_matcher.as_ref()
    }

    /// Suffix / shape patterns
    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }
}

/// A relationship class: indicator phrases plus proposal templates
#[derive(Debug)]
pub struct RelationshipClass {
    /// Class name (e.g. "treatment")
    pub name: String,
    /// Whether an intervention mention is forced onto the source side
    pub intervention_source: bool,
    /// Indicator phrases
    pub indicators: Vec<String>,
    /// Catalog type ids this class resembles, in preference order
    pub similar_types: Vec<String>,
    /// Proposal name template
    pub name_template: String,
    /// Proposal description template
    pub description_template: String,
    /// Suggested property schema for candidates of this class
    pub property_schema: PropertySchema,
    matcher: Regex,
}

impl RelationshipClass {
    /// Whether an indicator phrase occurs in `text`
    pub fn indicated_in(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

/// One evidence strength tier
#[derive(Debug)]
pub struct EvidenceTier {
    /// Tier name (e.g. "strong")
    pub name: String,
    /// Score assigned when a phrase matches
    pub score: f64,
    matcher: Regex,
}

impl EvidenceTier {
    /// Whether a tier phrase occurs in `text`
    pub fn matches(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

/// Render a proposal template
///
/// Placeholders: `{source}`, `{target}`, `{source_type}`, `{target_type}`,
/// `{class}`.
pub fn render_template(
    template: &str,
    class: &str,
    source: &str,
    target: &str,
    source_type: EntityType,
    target_type: EntityType,
) -> String {
    template
        .replace("{source_type}", source_type.as_str())
        .replace("{target_type}", target_type.as_str())
        .replace("{source}", source)
        .replace("{target}", target)
        .replace("{class}", class)
}

/// The compiled clinical vocabulary
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Debug)]
pub struct Vocabulary {
    entities: Vec<EntityMatcher>,
    classes: Vec<RelationshipClass>,
    evidence_tiers: Vec<EvidenceTier>,
    default_evidence: f64,
    clinical_keywords: Option<Regex>,
    consistency: HashMap<(String, EntityType, EntityType), f64>,
    default_consistency: f64,
}

impl Vocabulary {
    /// The shipped clinical vocabulary
    pub fn clinical() -> Result<Self, VocabularyError> {
        Self::from_toml(DEFAULT_VOCABULARY)
    }

    /// Load a vocabulary table from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, VocabularyError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Parse and compile a vocabulary table
    pub fn from_toml(toml_str: &str) -> Result<Self, VocabularyError> {
        let file: VocabularyFile = toml::from_str(toml_str)?;
        Self::compile(file)
    }

    fn compile(file: VocabularyFile) -> Result<Self, VocabularyError> {
        check_score("default_consistency", file.default_consistency)?;
        check_score("evidence.default_score", file.evidence.default_score)?;

        let mut entities = Vec::with_capacity(file.entities.len());
        for spec in file.entities {
            let keywords: Vec<String> = spec.keywords.iter().map(|k| k.to_lowercase()).collect();
            let patterns = spec
                .patterns
                .iter()
                .map(|p| compile_pattern(p))
                .collect::<Result<Vec<_>, _>>()?;
            entities.push(EntityMatcher {
                entity_type: spec.entity_type,
                keyword_matcher: phrase_matcher(&keywords)?,
                keywords,
                patterns,
            });
        }

        let mut classes = Vec::with_capacity(file.classes.len());
        for spec in file.classes {
            let matcher = phrase_matcher(&spec.indicators)?.ok_or_else(|| {
                VocabularyError::Invalid(format!("class '{}' has no indicator phrases", spec.name))
            })?;
            if classes.iter().any(|c: &RelationshipClass| c.name == spec.name) {
                return Err(VocabularyError::Invalid(format!("duplicate class '{}'", spec.name)));
            }
            classes.push(RelationshipClass {
                name: spec.name,
                intervention_source: spec.intervention_source,
                indicators: spec.indicators,
                similar_types: spec.similar_types,
                name_template: spec.name_template,
                description_template: spec.description_template,
                property_schema: spec.property_schema,
                matcher,
            });
        }

        let mut evidence_tiers = Vec::with_capacity(file.evidence.tiers.len());
        for tier in file.evidence.tiers {
            check_score(&format!("evidence tier '{}'", tier.name), tier.score)?;
            let matcher = phrase_matcher(&tier.phrases)?.ok_or_else(|| {
                VocabularyError::Invalid(format!("evidence tier '{}' has no phrases", tier.name))
            })?;
            evidence_tiers.push(EvidenceTier {
                name: tier.name,
                score: tier.score,
                matcher,
            });
        }

        let mut consistency = HashMap::new();
        for entry in file.consistency {
            check_score(&format!("consistency for '{}'", entry.class), entry.score)?;
            consistency.insert((entry.class, entry.source, entry.target), entry.score);
        }

        Ok(Self {
            entities,
            classes,
            evidence_tiers,
            default_evidence: file.evidence.default_score,
            clinical_keywords: phrase_matcher(&file.clinical_keywords)?,
            consistency,
            default_consistency: file.default_consistency,
        })
    }

    /// Entity matchers in table order
    pub fn entities(&self) -> &[EntityMatcher] {
        &self.entities
    }

    /// Relationship classes in precedence order
    pub fn classes(&self) -> &[RelationshipClass] {
        &self.classes
    }

    /// Look up a relationship class by name
    pub fn class(&self, name: &str) -> Option<&RelationshipClass> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Evidence tiers in precedence order
    pub fn evidence_tiers(&self) -> &[EvidenceTier] {
        &self.evidence_tiers
    }

    /// Evidence score when no tier phrase matches
    pub fn default_evidence(&self) -> f64 {
        self.default_evidence
    }

    /// Number of distinct clinical keywords occurring in `text`
    pub fn count_clinical_keywords(&self, text: &str) -> usize {
        let Some(matcher) = &self.clinical_keywords else {
            return 0;
        };
        let mut seen: Vec<String> = Vec::new();
        for m in matcher.find_iter(text) {
            let keyword = m.as_str().to_lowercase();
            if !seen.contains(&keyword) {
                seen.push(keyword);
            }
        }
        seen.len()
    }

    /// Consistency of a (class, source type, target type) pairing
    pub fn consistency(&self, class: &str, source: EntityType, target: EntityType) -> f64 {
        self.consistency
            .get(&(class.to_string(), source, target))
            .copied()
            .unwrap_or(self.default_consistency)
    }

    /// Classify an entity string by keyword lookup
    ///
    /// Tries an exact keyword match first, then a keyword occurring inside
    /// the string, then the shape patterns. Unmatched strings are `Unknown`.
    pub fn classify(&self, entity: &str) -> EntityType {
        let normalized = entity.trim().to_lowercase();

        if let Some(matcher) = self
            .entities
            .iter()
            .find(|m| m.keywords.iter().any(|k| *k == normalized))
        {
            return matcher.entity_type;
        }

        let mut best: Option<(usize, EntityType)> = None;
        for matcher in &self.entities {
            if let Some(m) = matcher.keyword_matcher().and_then(|r| r.find(&normalized)) {
                if best.is_none_or(|(len, _)| m.len() > len) {
                    best = Some((m.len(), matcher.entity_type));
                }
            }
        }
        if let Some((_, entity_type)) = best {
            return entity_type;
        }

        self.entities
            .iter()
            .find(|m| m.patterns.iter().any(|p| p.is_match(&normalized)))
            .map_or(EntityType::Unknown, |m| m.entity_type)
    }
}

fn check_score(what: &str, score: f64) -> Result<(), VocabularyError> {
    if (0.0..=1.0).contains(&score) {
        Ok(())
    } else {
        Err(VocabularyError::Invalid(format!(
            "{} score {} outside [0, 1]",
            what, score
        )))
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, VocabularyError> {
    Regex::new(pattern).map_err(|source| VocabularyError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Case-insensitive whole-word alternation over `phrases`, longest first so
/// the leftmost match at any position is also the longest
fn phrase_matcher(phrases: &[String]) -> Result<Option<Regex>, VocabularyError> {
    let mut sorted: Vec<&str> = phrases
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if sorted.is_empty() {
        return Ok(None);
    }
    sorted.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    sorted.dedup();

    let alternation = sorted
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    compile_pattern(&format!(r"(?i)\b(?:{})\b", alternation)).map(Some)
}
