use std::path::{Path, PathBuf};

use opwi_document::Document;
use opwi_types::Timestamp;
use serde::{Deserialize, Serialize};

/// Summary of one stored document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub title: String,
    /// Storage path relative to the root, e.g. `pages/main/Home.opwi`.
    pub path: String,
    pub namespace: String,
    pub created_at: Timestamp,
    /// Timestamp of the latest revision.
    pub last_modified: Timestamp,
    pub revision_count: usize,
    pub contributors: Vec<String>,
    /// The `DOC:` identifier. Absent in index files written before it was tracked.
    #[serde(default)]
    pub document_id: String,
}

impl IndexEntry {
    pub fn from_document(document: &Document, path: impl Into<String>) -> Self {
        Self {
            title: document.title().to_string(),
            path: path.into(),
            namespace: document.namespace().to_string(),
            created_at: document.created_at().clone(),
            last_modified: document.latest_timestamp().clone(),
            revision_count: document.revision_count(),
            contributors: document.contributors().to_vec(),
            document_id: document.doc_id().to_string(),
        }
    }

    /// Refresh the fields a new revision changes.
    pub fn record_revision(&mut self, document: &Document) {
        self.last_modified = document.latest_timestamp().clone();
        self.revision_count = document.revision_count();
        self.contributors = document.contributors().to_vec();
    }

    /// Absolute location of the document file. Tolerates the leading `/`
    /// that older index files put on `path`.
    pub fn file_path(&self, root: &Path) -> PathBuf {
        root.join(self.path.trim_start_matches('/'))
    }
}

/// A namespace known to the index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    pub path: String,
    #[serde(default)]
    pub description: String,
}
