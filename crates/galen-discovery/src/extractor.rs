//! Entity mention extraction and pairing

use crate::{DiscoveryConfig, Vocabulary};
use galen_domain::text::window_bounds;
use galen_domain::EntityType;
use std::sync::Arc;
use tracing::debug;

/// One entity mention found in text
#[derive(Debug, Clone, PartialEq)]
pub struct Mention {
    /// Mention text as it appears in the source
    pub text: String,
    /// Vocabulary type
    pub entity_type: EntityType,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

impl Mention {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

/// A seed pair: two mentions, a relationship class, and their context
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPair {
    /// Source mention (after direction normalisation)
    pub source: Mention,
    /// Target mention
    pub target: Mention,
    /// Relationship class name
    pub relationship_class: String,
    /// Context window around both mentions
    pub context: String,
    /// Byte offset of `context` in the scanned text
    pub context_start: usize,
}

/// Mention ordering inside the candidate list before overlap removal
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchKind {
    Keyword,
    Pattern,
}

/// Finds entity mentions and pairs them through indicator phrases
///
/// Pure over its input text, so one extractor can be shared across threads
/// and run per section in parallel.
#[derive(Debug, Clone)]
pub struct EntityPairExtractor {
    vocabulary: Arc<Vocabulary>,
    config: DiscoveryConfig,
}

impl EntityPairExtractor {
    /// Create an extractor over a vocabulary
    pub fn new(vocabulary: Arc<Vocabulary>, config: DiscoveryConfig) -> Self {
        Self { vocabulary, config }
    }

    /// The vocabulary in use
    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    /// All non-overlapping entity mentions in `text`, in textual order
    ///
    /// Overlaps resolve to the earliest start, then the longest span, then
    /// keyword matches over pattern matches.
    pub fn extract_mentions(&self, text: &str) -> Vec<Mention> {
        let mut found: Vec<(Mention, MatchKind, usize)> = Vec::new();

        for (rank, matcher) in self.vocabulary.entities().iter().enumerate() {
            if let Some(keywords) = matcher.keyword_matcher() {
                for m in keywords.find_iter(text) {
                    found.push((mention(m, matcher.entity_type), MatchKind::Keyword, rank));
                }
            }
            for pattern in matcher.patterns() {
                for m in pattern.find_iter(text) {
                    found.push((mention(m, matcher.entity_type), MatchKind::Pattern, rank));
                }
            }
        }

        found.sort_by(|(a, a_kind, a_rank), (b, b_kind, b_rank)| {
            a.start
                .cmp(&b.start)
                .then_with(|| b.len().cmp(&a.len()))
                .then_with(|| a_kind.cmp(b_kind))
                .then_with(|| a_rank.cmp(b_rank))
        });

        let mut mentions: Vec<Mention> = Vec::new();
        for (candidate, _, _) in found {
            if candidate.start == candidate.end {
                continue;
            }
            if mentions.last().is_none_or(|last| candidate.start >= last.end) {
                mentions.push(candidate);
            }
        }
        mentions
    }

    /// Seed pairs for every nearby mention pair joined by an indicator phrase
    pub fn extract_pairs(&self, text: &str) -> Vec<EntityPair> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mentions = self.extract_mentions(text);
        let mut pairs = Vec::new();

        for (i, first) in mentions.iter().enumerate() {
            for second in &mentions[i + 1..] {
                if text[first.end..second.start].chars().count() > self.config.max_pair_distance {
                    break;
                }
                if first.text.eq_ignore_ascii_case(&second.text) {
                    continue;
                }
                let Some(class) = self.classify_pair(text, first, second) else {
                    continue;
                };
                pairs.push(self.build_pair(text, first, second, class));
            }
        }

        debug!(mentions = mentions.len(), pairs = pairs.len(), "Extracted entity pairs");
        pairs
    }

    /// First class indicated between the mentions, else within the margin
    fn classify_pair(&self, text: &str, first: &Mention, second: &Mention) -> Option<&str> {
        let classes = self.vocabulary.classes();

        let between = &text[first.end..second.start];
        if let Some(class) = classes.iter().find(|c| c.indicated_in(between)) {
            return Some(&class.name);
        }

        if self.config.indicator_margin == 0 {
            return None;
        }
        let (lo, hi) = window_bounds(text, first.start, second.end, self.config.indicator_margin);
        let around = &text[lo..hi];
        classes
            .iter()
            .find(|c| c.indicated_in(around))
            .map(|c| c.name.as_str())
    }

    fn build_pair(&self, text: &str, first: &Mention, second: &Mention, class: &str) -> EntityPair {
        let intervention_source = self
            .vocabulary
            .class(class)
            .is_some_and(|c| c.intervention_source);

        let (source, target) = if intervention_source
            && !first.entity_type.is_intervention()
            && second.entity_type.is_intervention()
        {
            debug!(
                class,
                source = %second.text,
                target = %first.text,
                "Swapped pair so the intervention is the source"
            );
            (second, first)
        } else {
            (first, second)
        };

        let (lo, hi) = window_bounds(text, first.start, second.end, self.config.context_radius);
        EntityPair {
            source: source.clone(),
            target: target.clone(),
            relationship_class: class.to_string(),
            context: text[lo..hi].trim().to_string(),
            context_start: lo,
        }
    }
}

fn mention(m: regex::Match<'_>, entity_type: EntityType) -> Mention {
    Mention {
        text: m.as_str().to_string(),
        entity_type,
        start: m.start(),
        end: m.end(),
    }
}
