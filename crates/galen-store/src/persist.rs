//! File-based durability
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/<document_id>/content.txt
//! <root>/<document_id>/metadata.json      { document, table_of_contents }
//! <root>/<document_id>/anchors/<anchor_id>.json
//! ```
//!
//! A document is reloaded purely from `metadata.json` + `content.txt`. Anchor
//! files are never removed, so anchors of deleted documents still load.

use crate::StoreError;
use galen_domain::{Anchor, Document, TocEntry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONTENT_FILE: &str = "content.txt";
const METADATA_FILE: &str = "metadata.json";
const ANCHORS_DIR: &str = "anchors";

#[derive(Serialize, Deserialize)]
struct MetadataFile {
    document: Document,
    table_of_contents: Vec<TocEntry>,
}

/// Everything found under a store root
#[derive(Default)]
pub(crate) struct Snapshot {
    pub documents: Vec<(Document, String)>,
    pub anchors: Vec<Anchor>,
}

fn document_dir(root: &Path, document_id: &str) -> PathBuf {
    root.join(document_id)
}

pub(crate) fn write_document(root: &Path, document: &Document, content: &str) -> Result<(), StoreError> {
    let dir = document_dir(root, &document.id);
    fs::create_dir_all(dir.join(ANCHORS_DIR))?;

    let metadata = MetadataFile {
        document: document.clone(),
        table_of_contents: document.table_of_contents(),
    };
    fs::write(dir.join(CONTENT_FILE), content)?;
    fs::write(dir.join(METADATA_FILE), serde_json::to_string_pretty(&metadata)?)?;
    Ok(())
}

pub(crate) fn write_anchor(root: &Path, anchor: &Anchor) -> Result<(), StoreError> {
    let dir = document_dir(root, &anchor.document_id).join(ANCHORS_DIR);
    fs::create_dir_all(&dir)?;
    fs::write(
        dir.join(format!("{}.json", anchor.id)),
        serde_json::to_string_pretty(anchor)?,
    )?;
    Ok(())
}

/// Remove a document's content and metadata, leaving its anchors in place
pub(crate) fn remove_document(root: &Path, document_id: &str) -> Result<(), StoreError> {
    let dir = document_dir(root, document_id);
    for file in [CONTENT_FILE, METADATA_FILE] {
        let path = dir.join(file);
        if path.exists() {
            fs::remove_file(path)?;
        }
    }
    Ok(())
}

/// Read every document and anchor under `root`
pub(crate) fn load_all(root: &Path) -> Result<Snapshot, StoreError> {
    let mut snapshot = Snapshot::default();
    if !root.exists() {
        return Ok(snapshot);
    }

    for entry in fs::read_dir(root)? {
        let dir = entry?.path();
        if !dir.is_dir() {
            continue;
        }

        let metadata_path = dir.join(METADATA_FILE);
        let content_path = dir.join(CONTENT_FILE);
        if metadata_path.exists() && content_path.exists() {
            let metadata: MetadataFile = serde_json::from_str(&fs::read_to_string(&metadata_path)?)?;
            let content = fs::read_to_string(&content_path)?;
            debug!(document_id = %metadata.document.id, "Loaded document from disk");
            snapshot.documents.push((metadata.document, content));
        }

        let anchors_dir = dir.join(ANCHORS_DIR);
        if anchors_dir.is_dir() {
            for anchor_entry in fs::read_dir(&anchors_dir)? {
                let path = anchor_entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                match serde_json::from_str::<Anchor>(&fs::read_to_string(&path)?) {
                    Ok(anchor) => snapshot.anchors.push(anchor),
                    Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable anchor file"),
                }
            }
        }
    }

    Ok(snapshot)
}
