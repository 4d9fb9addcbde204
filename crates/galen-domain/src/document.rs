//! Documents and their heading-derived section tree

use crate::hashing::stable_id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source format of a loaded document, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// Plain text or markdown
    PlainText,
    /// HTML markup
    Html,
    /// Text already extracted from a PDF
    PdfText,
    /// XML markup
    Xml,
}

impl DocumentFormat {
    /// Map a file extension (without the dot) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "text" | "md" | "markdown" => Some(DocumentFormat::PlainText),
            "html" | "htm" | "xhtml" => Some(DocumentFormat::Html),
            "pdf" => Some(DocumentFormat::PdfText),
            "xml" => Some(DocumentFormat::Xml),
            _ => None,
        }
    }

    /// Get the format name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => "plain_text",
            DocumentFormat::Html => "html",
            DocumentFormat::PdfText => "pdf_text",
            DocumentFormat::Xml => "xml",
        }
    }
}

/// Byte span `[start, end)` in a document's extracted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset
    pub start: usize,
    /// Exclusive end offset
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `offset` falls inside the span
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// A contiguous, heading-delimited span of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Identifier unique within the owning document (`s1`, `s2`, …)
    pub id: String,

    /// Heading text
    pub title: String,

    /// Heading level (1 = major section)
    pub level: u8,

    /// Span covering the heading and all nested subsections
    pub span: Span,

    /// Parent section, if nested
    pub parent_id: Option<String>,

    /// Ordered child section ids
    #[serde(default)]
    pub children: Vec<String>,

    /// Byte offset just past the heading line; equals `span.start` for
    /// sections without a heading
    #[serde(default)]
    pub body_start: usize,

    /// Body text directly under this heading, excluding child sections
    pub content: String,
}

/// Caller-supplied metadata for a document load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Title; defaults to the source file stem when absent
    pub title: Option<String>,

    /// Issuing body or origin (e.g. "NICE", "ADA")
    pub source: String,

    /// Guideline version string
    pub version: String,

    /// Free-form metadata
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl DocumentMetadata {
    /// Create metadata with source and version
    pub fn new(source: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: None,
            source: source.into(),
            version: version.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a free-form metadata entry
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// One entry in a document's table of contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Section id
    pub section_id: String,
    /// Section title
    pub title: String,
    /// Heading level as parsed
    pub level: u8,
    /// Nesting depth in the tree (0 = root)
    pub depth: usize,
}

/// A loaded guideline document
///
/// Owns its sections exclusively; deleting the document deletes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Deterministic id from title, source, version, and content hash
    pub id: String,

    /// Document title
    pub title: String,

    /// Issuing body or origin
    pub source: String,

    /// Guideline version
    pub version: String,

    /// SHA-256 of the extracted text
    pub checksum: String,

    /// Format the text was extracted from
    pub format: DocumentFormat,

    /// When this copy was loaded (seconds since epoch)
    pub loaded_at: u64,

    /// Free-form metadata
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// Sections in document order
    pub sections: Vec<Section>,
}

impl Document {
    /// Compute the deterministic document id
    pub fn compute_id(title: &str, source: &str, version: &str, checksum: &str) -> String {
        stable_id("doc", &[title, source, version, checksum])
    }

    /// Look up a section by id
    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    /// Sections without a parent, in document order
    pub fn root_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| s.parent_id.is_none())
    }

    /// Flattened table of contents in document order
    pub fn table_of_contents(&self) -> Vec<TocEntry> {
        self.sections
            .iter()
            .map(|section| TocEntry {
                section_id: section.id.clone(),
                title: section.title.clone(),
                level: section.level,
                depth: self.depth_of(section),
            })
            .collect()
    }

    fn depth_of(&self, section: &Section) -> usize {
        let mut depth = 0;
        let mut parent = section.parent_id.as_deref();
        while let Some(parent_id) = parent {
            depth += 1;
            parent = self.section(parent_id).and_then(|p| p.parent_id.as_deref());
        }
        depth
    }
}
