//! Thread-safe document store with provenance anchoring

use crate::format::extract_text;
use crate::sections::build_sections;
use crate::{persist, StoreConfig, StoreError};
use galen_domain::hashing::sha256_hex;
use galen_domain::text::window_bounds;
use galen_domain::{
    current_timestamp, Anchor, AnchorResolution, ContextWindow, Document, DocumentFormat,
    DocumentMetadata, TocEntry,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

struct StoredDocument {
    document: Document,
    content: String,
}

/// Document and anchor store
///
/// All operations take `&self`; documents and anchors sit behind separate
/// read/write locks so readers never block each other and anchor creation is
/// atomic per id. When configured with a root directory every mutation is
/// written through to disk before it becomes visible.
///
/// # Thread Safety
///
/// `DocumentStore` is `Send + Sync` and is meant to be shared behind an `Arc`.
pub struct DocumentStore {
    config: StoreConfig,
    documents: RwLock<BTreeMap<String, StoredDocument>>,
    anchors: RwLock<BTreeMap<String, Anchor>>,
}

impl DocumentStore {
    /// Create a store from configuration, reloading from disk when a root is set
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate().map_err(StoreError::Config)?;

        let store = Self {
            config,
            documents: RwLock::new(BTreeMap::new()),
            anchors: RwLock::new(BTreeMap::new()),
        };

        if let Some(root) = store.root() {
            std::fs::create_dir_all(root)?;
            let snapshot = persist::load_all(root)?;
            info!(
                root = %root.display(),
                documents = snapshot.documents.len(),
                anchors = snapshot.anchors.len(),
                "Opened document store"
            );

            let mut documents = store.documents.write();
            for (document, content) in snapshot.documents {
                documents.insert(document.id.clone(), StoredDocument { document, content });
            }
            drop(documents);

            let mut anchors = store.anchors.write();
            for anchor in snapshot.anchors {
                anchors.insert(anchor.id.clone(), anchor);
            }
        }

        Ok(store)
    }

    /// Create a purely in-memory store with default configuration
    pub fn in_memory() -> Self {
        Self {
            config: StoreConfig::default(),
            documents: RwLock::new(BTreeMap::new()),
            anchors: RwLock::new(BTreeMap::new()),
        }
    }

    /// Open (or create) a persistent store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::new(StoreConfig::persistent(root))
    }

    /// Active configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn root(&self) -> Option<&Path> {
        self.config.root.as_deref()
    }

    /// Load a document from a source name and its raw text
    ///
    /// The format is chosen by the extension of `source`. Loading identical
    /// content and metadata again yields the same document id and replaces the
    /// stored copy.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFormat` if the extension is not recognised
    /// - `EmptyContent` if no text remains after extraction
    pub fn load(
        &self,
        source: &str,
        raw: &str,
        metadata: DocumentMetadata,
    ) -> Result<Document, StoreError> {
        let format = Path::new(source)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(DocumentFormat::from_extension)
            .ok_or_else(|| StoreError::UnsupportedFormat(source.to_string()))?;

        let content = extract_text(format, raw);
        if content.trim().is_empty() {
            return Err(StoreError::EmptyContent(source.to_string()));
        }

        let title = metadata.title.clone().unwrap_or_else(|| {
            Path::new(source)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(source)
                .to_string()
        });
        let checksum = sha256_hex(content.as_bytes());
        let id = Document::compute_id(&title, &metadata.source, &metadata.version, &checksum);
        let sections = build_sections(&content, &title);

        let document = Document {
            id,
            title,
            source: metadata.source,
            version: metadata.version,
            checksum,
            format,
            loaded_at: current_timestamp(),
            metadata: metadata.extra,
            sections,
        };

        let mut documents = self.documents.write();
        if let Some(root) = self.root() {
            persist::write_document(root, &document, &content)?;
        }
        let replaced = documents
            .insert(
                document.id.clone(),
                StoredDocument {
                    document: document.clone(),
                    content,
                },
            )
            .is_some();

        info!(
            document_id = %document.id,
            title = %document.title,
            format = document.format.as_str(),
            sections = document.sections.len(),
            replaced,
            "Loaded document"
        );
        Ok(document)
    }

    /// Read a file and load it, using the path as the source name
    pub fn load_file(
        &self,
        path: impl AsRef<Path>,
        metadata: DocumentMetadata,
    ) -> Result<Document, StoreError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let raw = String::from_utf8_lossy(&bytes);
        self.load(&path.to_string_lossy(), &raw, metadata)
    }

    /// Get a document by id
    pub fn get_document(&self, document_id: &str) -> Result<Document, StoreError> {
        self.documents
            .read()
            .get(document_id)
            .map(|stored| stored.document.clone())
            .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))
    }

    /// All loaded documents, ordered by id
    pub fn list_documents(&self) -> Vec<Document> {
        self.documents
            .read()
            .values()
            .map(|stored| stored.document.clone())
            .collect()
    }

    /// Flattened table of contents for a document
    pub fn table_of_contents(&self, document_id: &str) -> Result<Vec<TocEntry>, StoreError> {
        Ok(self.get_document(document_id)?.table_of_contents())
    }

    /// Get the full text of a document, or the body of one of its sections
    pub fn get_content(
        &self,
        document_id: &str,
        section_id: Option<&str>,
    ) -> Result<String, StoreError> {
        let documents = self.documents.read();
        let stored = documents
            .get(document_id)
            .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))?;

        match section_id {
            None => Ok(stored.content.clone()),
            Some(section_id) => stored
                .document
                .section(section_id)
                .map(|s| s.content.clone())
                .ok_or_else(|| StoreError::SectionNotFound {
                    document_id: document_id.to_string(),
                    section_id: section_id.to_string(),
                }),
        }
    }

    /// Remove a document and its sections
    ///
    /// Anchors into the document are kept and resolve as tombstones.
    pub fn delete_document(&self, document_id: &str) -> Result<Document, StoreError> {
        let mut documents = self.documents.write();
        if !documents.contains_key(document_id) {
            return Err(StoreError::DocumentNotFound(document_id.to_string()));
        }
        if let Some(root) = self.root() {
            persist::remove_document(root, document_id)?;
        }
        let removed = documents
            .remove(document_id)
            .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))?;

        info!(document_id, "Deleted document; anchors retained as tombstones");
        Ok(removed.document)
    }

    /// Create a provenance anchor and return its id
    ///
    /// The id is a stable hash of (document, section, text). If it already
    /// exists the stored anchor is left untouched and the id is returned.
    pub fn create_anchor(
        &self,
        document_id: &str,
        section_id: &str,
        text: &str,
        anchor_type: &str,
        position: usize,
        context: &str,
    ) -> Result<String, StoreError> {
        {
            let documents = self.documents.read();
            let stored = documents
                .get(document_id)
                .ok_or_else(|| StoreError::DocumentNotFound(document_id.to_string()))?;
            if stored.document.section(section_id).is_none() {
                return Err(StoreError::SectionNotFound {
                    document_id: document_id.to_string(),
                    section_id: section_id.to_string(),
                });
            }
        }

        let id = Anchor::compute_id(document_id, section_id, text);

        let mut anchors = self.anchors.write();
        if anchors.contains_key(&id) {
            debug!(anchor_id = %id, "Anchor already exists");
            return Ok(id);
        }

        let anchor = Anchor {
            id: id.clone(),
            document_id: document_id.to_string(),
            section_id: section_id.to_string(),
            text: text.to_string(),
            context: context.to_string(),
            anchor_type: anchor_type.to_string(),
            position,
            created_at: current_timestamp(),
        };
        if let Some(root) = self.root() {
            persist::write_anchor(root, &anchor)?;
        }
        anchors.insert(id.clone(), anchor);

        debug!(anchor_id = %id, document_id, section_id, anchor_type, "Created anchor");
        Ok(id)
    }

    /// Get an anchor without resolving it
    pub fn get_anchor(&self, anchor_id: &str) -> Result<Anchor, StoreError> {
        self.anchors
            .read()
            .get(anchor_id)
            .cloned()
            .ok_or_else(|| StoreError::AnchorNotFound(anchor_id.to_string()))
    }

    /// Anchors pointing into a document, ordered by position
    pub fn list_anchors(&self, document_id: &str) -> Vec<Anchor> {
        let mut anchors: Vec<Anchor> = self
            .anchors
            .read()
            .values()
            .filter(|a| a.document_id == document_id)
            .cloned()
            .collect();
        anchors.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        anchors
    }

    /// Resolve an anchor to its text and surrounding context
    ///
    /// Fails only for ids that were never created. If the owning document has
    /// since been deleted the result is a metadata-only tombstone.
    pub fn resolve_anchor(&self, anchor_id: &str) -> Result<AnchorResolution, StoreError> {
        let anchor = self.get_anchor(anchor_id)?;

        let documents = self.documents.read();
        let Some(stored) = documents.get(&anchor.document_id) else {
            debug!(anchor_id, document_id = %anchor.document_id, "Resolved tombstoned anchor");
            return Ok(AnchorResolution::tombstone(anchor));
        };

        let section_content = stored
            .document
            .section(&anchor.section_id)
            .map(|s| s.content.clone());
        let context_window = context_window(&stored.content, anchor.position, self.config.context_radius);

        Ok(AnchorResolution {
            document_content: Some(stored.content.clone()),
            section_content,
            context_window: Some(context_window),
            tombstoned: false,
            anchor,
        })
    }
}

/// Window of `content` centred on `position`, clamped to the text and to
/// UTF-8 character boundaries
fn context_window(content: &str, position: usize, radius: usize) -> ContextWindow {
    let position = position.min(content.len());
    let (start, end) = window_bounds(content, position, position, radius);
    ContextWindow {
        start,
        end,
        text: content[start..end].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> DocumentMetadata {
        DocumentMetadata::new("NICE", "2024").with_title("Hypertension in adults")
    }

    const GUIDELINE: &str = "# Hypertension\n\
        Hypertension is managed with diuretics.\n\
        ## Step 1\n\
        Offer ACE inhibitors to adults under 55.\n\
        ## Step 2\n\
        Add a calcium-channel blocker.\n";

    #[test]
    fn test_load_is_idempotent() {
        let store = DocumentStore::in_memory();
        let a = store.load("htn.md", GUIDELINE, metadata()).unwrap();
        let b = store.load("htn.md", GUIDELINE, metadata()).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.checksum, b.checksum);
        assert_eq!(store.list_documents().len(), 1);
    }

    #[test]
    fn test_changed_content_changes_id() {
        let store = DocumentStore::in_memory();
        let a = store.load("htn.md", GUIDELINE, metadata()).unwrap();
        let b = store.load("htn.md", "# Other\ntext", metadata()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_unsupported_format() {
        let store = DocumentStore::in_memory();
        let err = store.load("guideline.docx", "text", metadata()).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedFormat(_)));

        let err = store.load("no_extension", "text", metadata()).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_empty_content() {
        let store = DocumentStore::in_memory();
        let err = store.load("blank.html", "<p> </p>", metadata()).unwrap_err();
        assert!(matches!(err, StoreError::EmptyContent(_)));
    }

    #[test]
    fn test_title_defaults_to_file_stem() {
        let store = DocumentStore::in_memory();
        let doc = store
            .load("guidelines/asthma.txt", "Use inhaled corticosteroids.", DocumentMetadata::new("BTS", "1"))
            .unwrap();
        assert_eq!(doc.title, "asthma");
        assert_eq!(doc.sections[0].title, "asthma");
    }

    #[test]
    fn test_get_content() {
        let store = DocumentStore::in_memory();
        let doc = store.load("htn.md", GUIDELINE, metadata()).unwrap();

        let full = store.get_content(&doc.id, None).unwrap();
        assert!(full.contains("calcium-channel"));

        let step1 = store.get_content(&doc.id, Some("s2")).unwrap();
        assert_eq!(step1, "Offer ACE inhibitors to adults under 55.");

        assert!(matches!(
            store.get_content(&doc.id, Some("s9")),
            Err(StoreError::SectionNotFound { .. })
        ));
        assert!(matches!(
            store.get_content("doc_missing", None),
            Err(StoreError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_anchor_roundtrip_window_contains_position() {
        let store = DocumentStore::in_memory();
        let doc = store.load("htn.md", GUIDELINE, metadata()).unwrap();

        let id = store
            .create_anchor(&doc.id, "s1", "ACE inhibitors", "recommendation", 42, "ctx")
            .unwrap();
        let resolution = store.resolve_anchor(&id).unwrap();

        assert_eq!(resolution.anchor.text, "ACE inhibitors");
        assert!(!resolution.tombstoned);
        let window = resolution.context_window.unwrap();
        assert!(window.covers(42));
        assert_eq!(window.text, &store.get_content(&doc.id, None).unwrap()[window.start..window.end]);
    }

    #[test]
    fn test_anchor_is_append_only() {
        let store = DocumentStore::in_memory();
        let doc = store.load("htn.md", GUIDELINE, metadata()).unwrap();

        let first = store
            .create_anchor(&doc.id, "s2", "ACE inhibitors", "recommendation", 10, "first")
            .unwrap();
        let second = store
            .create_anchor(&doc.id, "s2", "ACE inhibitors", "concept", 99, "second")
            .unwrap();

        assert_eq!(first, second);
        let anchor = store.get_anchor(&first).unwrap();
        assert_eq!(anchor.context, "first");
        assert_eq!(anchor.position, 10);
        assert_eq!(store.list_anchors(&doc.id).len(), 1);
    }

    #[test]
    fn test_anchor_requires_existing_section() {
        let store = DocumentStore::in_memory();
        let doc = store.load("htn.md", GUIDELINE, metadata()).unwrap();
        assert!(matches!(
            store.create_anchor(&doc.id, "s42", "x", "concept", 0, ""),
            Err(StoreError::SectionNotFound { .. })
        ));
        assert!(matches!(
            store.create_anchor("doc_nope", "s1", "x", "concept", 0, ""),
            Err(StoreError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_delete_tombstones_anchors() {
        let store = DocumentStore::in_memory();
        let doc = store.load("htn.md", GUIDELINE, metadata()).unwrap();
        let id = store
            .create_anchor(&doc.id, "s1", "diuretics", "concept", 40, "")
            .unwrap();

        store.delete_document(&doc.id).unwrap();

        let resolution = store.resolve_anchor(&id).unwrap();
        assert!(resolution.tombstoned);
        assert_eq!(resolution.anchor.text, "diuretics");
        assert!(resolution.document_content.is_none());
        assert!(matches!(
            store.get_document(&doc.id),
            Err(StoreError::DocumentNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_anchor() {
        let store = DocumentStore::in_memory();
        assert!(matches!(
            store.resolve_anchor("anc_never"),
            Err(StoreError::AnchorNotFound(_))
        ));
    }

    #[test]
    fn test_context_window_clamps_and_respects_char_boundaries() {
        let content = "αβγ hypertension δ";
        let window = context_window(content, 1000, 3);
        assert_eq!(window.end, content.len());
        assert!(window.covers(content.len()));

        let window = context_window(content, 1, 1);
        assert_eq!(window.start, 0);
        assert!(content.is_char_boundary(window.end));
    }

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DocumentStore>();
    }
}
