//! Integration tests for the file-based durability layout

use galen_domain::DocumentMetadata;
use galen_store::{DocumentStore, StoreConfig, StoreError};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const GUIDELINE: &str = "1. Introduction\n\
    This guideline covers type 2 diabetes.\n\
    2. Treatment\n\
    Metformin is commonly used to treat type 2 diabetes mellitus.\n\
    2.1 Second line\n\
    Consider adding an SGLT2 inhibitor.\n";

fn metadata() -> DocumentMetadata {
    DocumentMetadata::new("ADA", "2024").with_title("Standards of Care")
}

#[test]
fn test_layout_on_disk() {
    let dir = TempDir::new().unwrap();
    let store = DocumentStore::open(dir.path()).unwrap();
    let doc = store.load("ada.txt", GUIDELINE, metadata()).unwrap();
    let anchor_id = store
        .create_anchor(&doc.id, "s2", "Metformin", "concept", 60, "")
        .unwrap();

    let doc_dir = dir.path().join(&doc.id);
    assert!(doc_dir.join("content.txt").is_file());
    assert!(doc_dir.join("metadata.json").is_file());
    assert!(doc_dir.join("anchors").join(format!("{}.json", anchor_id)).is_file());

    let metadata: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(doc_dir.join("metadata.json")).unwrap()).unwrap();
    assert_eq!(metadata["document"]["id"], doc.id.as_str());
    assert_eq!(metadata["table_of_contents"].as_array().unwrap().len(), 3);
    assert_eq!(metadata["table_of_contents"][2]["depth"], 1);
}

#[test]
fn test_reopen_restores_documents_and_anchors() {
    let dir = TempDir::new().unwrap();
    let (doc_id, anchor_id) = {
        let store = DocumentStore::open(dir.path()).unwrap();
        let doc = store.load("ada.txt", GUIDELINE, metadata()).unwrap();
        let anchor_id = store
            .create_anchor(&doc.id, "s3", "SGLT2 inhibitor", "recommendation", 130, "ctx")
            .unwrap();
        (doc.id, anchor_id)
    };

    let reopened = DocumentStore::open(dir.path()).unwrap();
    let doc = reopened.get_document(&doc_id).unwrap();
    assert_eq!(doc.sections.len(), 3);
    assert_eq!(doc.sections[2].parent_id.as_deref(), Some("s2"));

    let resolution = reopened.resolve_anchor(&anchor_id).unwrap();
    assert!(!resolution.tombstoned);
    assert_eq!(resolution.anchor.text, "SGLT2 inhibitor");
    assert_eq!(
        resolution.section_content.as_deref(),
        Some("Consider adding an SGLT2 inhibitor.")
    );
    assert!(resolution.context_window.unwrap().covers(130));
}

#[test]
fn test_deleted_document_anchors_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let (doc_id, anchor_id) = {
        let store = DocumentStore::open(dir.path()).unwrap();
        let doc = store.load("ada.txt", GUIDELINE, metadata()).unwrap();
        let anchor_id = store
            .create_anchor(&doc.id, "s1", "type 2 diabetes", "concept", 40, "")
            .unwrap();
        store.delete_document(&doc.id).unwrap();
        (doc.id, anchor_id)
    };

    let reopened = DocumentStore::open(dir.path()).unwrap();
    assert!(matches!(
        reopened.get_document(&doc_id),
        Err(StoreError::DocumentNotFound(_))
    ));
    let resolution = reopened.resolve_anchor(&anchor_id).unwrap();
    assert!(resolution.tombstoned);
    assert!(resolution.section_content.is_none());
}

#[test]
fn test_load_file_detects_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("asthma.html");
    std::fs::write(
        &path,
        "<h1>Asthma</h1><p>Inhaled corticosteroids treat asthma.</p><h2>Review</h2><p>Annual.</p>",
    )
    .unwrap();

    let store = DocumentStore::new(StoreConfig::default()).unwrap();
    let doc = store
        .load_file(&path, DocumentMetadata::new("BTS", "2019"))
        .unwrap();

    assert_eq!(doc.title, "asthma");
    assert_eq!(doc.format.as_str(), "html");
    assert_eq!(doc.sections.len(), 2);
    assert_eq!(doc.sections[1].title, "Review");
    assert_eq!(doc.sections[1].parent_id.as_deref(), Some("s1"));
}

#[test]
fn test_concurrent_anchor_creation() {
    let store = Arc::new(DocumentStore::in_memory());
    let doc = store.load("ada.txt", GUIDELINE, metadata()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            let doc_id = doc.id.clone();
            thread::spawn(move || {
                // Half the threads race on the same anchor text
                let text = if i % 2 == 0 { "Metformin".to_string() } else { format!("term {}", i) };
                store.create_anchor(&doc_id, "s2", &text, "concept", i, "").unwrap()
            })
        })
        .collect();

    let ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(store.list_anchors(&doc.id).len(), 5);
    assert_eq!(ids[0], ids[2]);
}
