//! Provenance anchors
//!
//! An anchor points from a derived fact back to the exact text it came from.
//! Anchors are append-only and hold only a weak (id) reference to their
//! document, so they outlive document deletion and resolve as tombstones.

use crate::hashing::stable_id;
use serde::{Deserialize, Serialize};

/// A provenance pointer into document text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// Stable hash of (document id, section id, text)
    pub id: String,

    /// Owning document (lookup only)
    pub document_id: String,

    /// Section the text was found in
    pub section_id: String,

    /// Referenced text
    pub text: String,

    /// Surrounding context captured at creation time
    pub context: String,

    /// Kind of anchor (e.g. "recommendation", "concept", "relationship")
    pub anchor_type: String,

    /// Byte offset of the referenced text in the document
    pub position: usize,

    /// When the anchor was created (seconds since epoch)
    pub created_at: u64,
}

impl Anchor {
    /// Compute the stable id for an anchor
    pub fn compute_id(document_id: &str, section_id: &str, text: &str) -> String {
        stable_id("anc", &[document_id, section_id, text])
    }
}

/// A window of document text around an anchor position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWindow {
    /// Inclusive start offset in the document text
    pub start: usize,
    /// Exclusive end offset in the document text
    pub end: usize,
    /// The windowed text
    pub text: String,
}

impl ContextWindow {
    /// Whether the window covers `position` (end-inclusive, so a position at
    /// the very end of the text is still covered)
    pub fn covers(&self, position: usize) -> bool {
        position >= self.start && position <= self.end
    }
}

/// Result of resolving an anchor
///
/// When the owning document has been removed the anchor metadata is still
/// returned, content fields are `None`, and `tombstoned` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorResolution {
    /// The anchor itself
    pub anchor: Anchor,
    /// Full document text, if the document still exists
    pub document_content: Option<String>,
    /// Section body text, if the document still exists
    pub section_content: Option<String>,
    /// Window around the anchor position
    pub context_window: Option<ContextWindow>,
    /// Whether the owning document is gone
    pub tombstoned: bool,
}

impl AnchorResolution {
    /// Build a metadata-only result for an anchor whose document was removed
    pub fn tombstone(anchor: Anchor) -> Self {
        Self {
            anchor,
            document_content: None,
            section_content: None,
            context_window: None,
            tombstoned: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_id_is_stable() {
        let a = Anchor::compute_id("doc_1", "s1", "ACE inhibitors");
        let b = Anchor::compute_id("doc_1", "s1", "ACE inhibitors");
        let c = Anchor::compute_id("doc_1", "s2", "ACE inhibitors");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_tombstone_has_no_content() {
        let anchor = Anchor {
            id: "anc_1".to_string(),
            document_id: "doc_1".to_string(),
            section_id: "s1".to_string(),
            text: "t".to_string(),
            context: String::new(),
            anchor_type: "concept".to_string(),
            position: 0,
            created_at: 0,
        };
        let resolution = AnchorResolution::tombstone(anchor);
        assert!(resolution.tombstoned);
        assert!(resolution.document_content.is_none());
        assert!(resolution.context_window.is_none());
    }
}
