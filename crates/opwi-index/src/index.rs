use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use opwi_codec::OpwiCodec;
use opwi_types::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::address::address_for;
use crate::atomic::write_atomic;
use crate::entry::{IndexEntry, NamespaceEntry};
use crate::error::{IndexError, IndexResult};

/// Where document files live under the storage root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    pub pages_dir: String,
    pub extension: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            pages_dir: "pages".into(),
            extension: "opwi".into(),
        }
    }
}

/// Outcome of [`DocumentIndex::rebuild`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RebuildReport {
    pub indexed: usize,
    /// Files that matched the extension but could not be read or decoded.
    pub skipped: Vec<PathBuf>,
    /// Files that decoded with recoverable corruption.
    pub damaged: Vec<PathBuf>,
}

/// Address-keyed catalogue of stored documents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIndex {
    pub last_updated: Timestamp,
    #[serde(default)]
    pub documents: BTreeMap<String, IndexEntry>,
    #[serde(default)]
    pub namespaces: BTreeMap<String, NamespaceEntry>,
}

impl Default for DocumentIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentIndex {
    pub fn new() -> Self {
        Self {
            last_updated: Timestamp::now(),
            documents: BTreeMap::new(),
            namespaces: BTreeMap::new(),
        }
    }

    /// Load a persisted index.
    ///
    /// A missing or unparsable file yields an empty index; entries whose
    /// document file no longer exists under `root` are dropped.
    pub fn load(path: &Path, root: &Path) -> IndexResult<Self> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };
        let mut index: Self = match serde_json::from_str(&json) {
            Ok(index) => index,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding unreadable index");
                return Ok(Self::new());
            }
        };

        index.documents.retain(|address, entry| {
            let exists = entry.file_path(root).is_file();
            if !exists {
                debug!(address, path = %entry.path, "dropping stale index entry");
            }
            exists
        });
        Ok(index)
    }

    /// Write the index as pretty JSON through a temp file and rename.
    pub fn persist(&mut self, path: &Path) -> IndexResult<()> {
        self.last_updated = Timestamp::now();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| IndexError::Serialization(e.to_string()))?;
        write_atomic(path, json.as_bytes())?;
        debug!(path = %path.display(), documents = self.documents.len(), "index persisted");
        Ok(())
    }

    /// Regenerate every document entry from the files under `root`.
    ///
    /// Namespace descriptions survive; namespaces seen for the first time get
    /// an empty description. Files that cannot be read or have no `DOC:`
    /// header are skipped with a warning.
    pub fn rebuild(&mut self, root: &Path, options: &ScanOptions) -> IndexResult<RebuildReport> {
        if !root.is_dir() {
            return Err(IndexError::MissingRoot(root.to_path_buf()));
        }
        let pages = root.join(&options.pages_dir);
        let mut documents = BTreeMap::new();
        let mut report = RebuildReport::default();

        if pages.is_dir() {
            for entry in WalkDir::new(&pages).sort_by_file_name() {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let file = entry.path();
                let Some((address, namespace)) = address_for(&pages, file, &options.extension)
                else {
                    continue;
                };

                let text = match fs::read_to_string(file) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(path = %file.display(), error = %e, "skipping unreadable document");
                        report.skipped.push(file.to_path_buf());
                        continue;
                    }
                };
                let decoded = match OpwiCodec::deserialize(&text) {
                    Ok(decoded) => decoded,
                    Err(e) => {
                        warn!(path = %file.display(), error = %e, "skipping undecodable document");
                        report.skipped.push(file.to_path_buf());
                        continue;
                    }
                };
                if !decoded.is_clean() {
                    report.damaged.push(file.to_path_buf());
                }

                let relative = format!("{}/{}.{}", options.pages_dir, address, options.extension);
                let mut item = IndexEntry::from_document(&decoded.document, relative);
                item.namespace = namespace.clone();
                self.ensure_namespace(&namespace, &options.pages_dir);
                documents.insert(address, item);
            }
        }

        report.indexed = documents.len();
        self.documents = documents;
        self.last_updated = Timestamp::now();
        info!(
            root = %root.display(),
            indexed = report.indexed,
            skipped = report.skipped.len(),
            damaged = report.damaged.len(),
            "index rebuilt"
        );
        Ok(report)
    }

    pub fn get(&self, address: &str) -> Option<&IndexEntry> {
        self.documents.get(address)
    }

    pub fn get_mut(&mut self, address: &str) -> Option<&mut IndexEntry> {
        self.documents.get_mut(address)
    }

    /// Insert or replace the entry for `address`.
    pub fn insert(&mut self, address: impl Into<String>, entry: IndexEntry) {
        self.documents.insert(address.into(), entry);
    }

    pub fn contains(&self, address: &str) -> bool {
        self.documents.contains_key(address)
    }

    /// Find the entry stored at a root-relative `path` (a leading `/` is ignored).
    pub fn find_by_path(&self, path: &str) -> Option<(&str, &IndexEntry)> {
        let path = path.trim_start_matches('/');
        self.documents
            .iter()
            .find(|(_, entry)| entry.path.trim_start_matches('/') == path)
            .map(|(address, entry)| (address.as_str(), entry))
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.find_by_path(path).is_some()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &IndexEntry)> {
        self.documents.iter().map(|(a, e)| (a.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn namespaces(&self) -> &BTreeMap<String, NamespaceEntry> {
        &self.namespaces
    }

    /// Register `name` if it is not known yet. Returns `true` if it was added.
    pub fn ensure_namespace(&mut self, name: &str, pages_dir: &str) -> bool {
        if self.namespaces.contains_key(name) {
            return false;
        }
        let path = if name.is_empty() {
            pages_dir.to_string()
        } else {
            format!("{pages_dir}/{name}")
        };
        self.namespaces.insert(
            name.to_string(),
            NamespaceEntry {
                path,
                description: String::new(),
            },
        );
        true
    }

    /// Set the description of a namespace, registering it if needed.
    pub fn describe_namespace(&mut self, name: &str, pages_dir: &str, description: &str) {
        self.ensure_namespace(name, pages_dir);
        if let Some(entry) = self.namespaces.get_mut(name) {
            entry.description = description.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opwi_document::Document;

    fn write_doc(root: &Path, relative: &str, title: &str, namespace: &str, author: &str) -> Document {
        let doc = Document::create(title, namespace, "Hello world", author, "127.0.0.1").unwrap();
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, OpwiCodec::serialize(&doc).unwrap()).unwrap();
        doc
    }

    #[test]
    fn rebuild_indexes_namespaces() {
        let dir = tempfile::tempdir().unwrap();
        let home = write_doc(dir.path(), "pages/main/Home.opwi", "Home", "main", "alice");
        write_doc(dir.path(), "pages/wiki/Guide.opwi", "Guide", "wiki", "bob");
        fs::write(dir.path().join("pages/main/notes.txt"), "ignored").unwrap();

        let mut index = DocumentIndex::new();
        let report = index.rebuild(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(report.indexed, 2);
        assert!(report.skipped.is_empty());

        let addresses: Vec<&str> = index.entries().map(|(a, _)| a).collect();
        assert_eq!(addresses, ["main/Home", "wiki/Guide"]);
        let names: Vec<&String> = index.namespaces().keys().collect();
        assert_eq!(names, ["main", "wiki"]);

        let entry = index.get("main/Home").unwrap();
        assert_eq!(entry.path, "pages/main/Home.opwi");
        assert_eq!(entry.title, "Home");
        assert_eq!(entry.revision_count, 1);
        assert_eq!(entry.contributors, ["alice"]);
        assert_eq!(entry.document_id, home.doc_id().as_str());
        assert_eq!(&entry.last_modified, home.created_at());
    }

    #[test]
    fn rebuild_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "pages/main/Home.opwi", "Home", "main", "alice");
        let mut index = DocumentIndex::new();
        index.rebuild(dir.path(), &ScanOptions::default()).unwrap();
        let first = index.documents.clone();
        index.rebuild(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(index.documents, first);
    }

    #[test]
    fn rebuild_skips_headerless_files() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "pages/main/Home.opwi", "Home", "main", "alice");
        let broken = dir.path().join("pages/main/Broken.opwi");
        fs::write(&broken, "no header here").unwrap();

        let mut index = DocumentIndex::new();
        let report = index.rebuild(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(report.indexed, 1);
        assert_eq!(report.skipped, [broken]);
        assert!(!index.contains("main/Broken"));
    }

    #[test]
    fn rebuild_keeps_namespace_descriptions() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "pages/main/Home.opwi", "Home", "main", "alice");
        let mut index = DocumentIndex::new();
        index.describe_namespace("main", "pages", "Main namespace");
        index.rebuild(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(index.namespaces()["main"].description, "Main namespace");
        assert_eq!(index.namespaces()["main"].path, "pages/main");
    }

    #[test]
    fn rebuild_without_pages_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = DocumentIndex::new();
        let report = index.rebuild(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(report.indexed, 0);
        assert!(index.is_empty());
    }

    #[test]
    fn rebuild_requires_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = DocumentIndex::new()
            .rebuild(&missing, &ScanOptions::default())
            .unwrap_err();
        assert!(matches!(err, IndexError::MissingRoot(_)));
    }

    #[test]
    fn persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "pages/main/Home.opwi", "Home", "main", "alice");
        let mut index = DocumentIndex::new();
        index.rebuild(dir.path(), &ScanOptions::default()).unwrap();

        let path = dir.path().join("index/document_index.json");
        index.persist(&path).unwrap();
        let loaded = DocumentIndex::load(&path, dir.path()).unwrap();
        assert_eq!(loaded, index);
    }

    #[test]
    fn load_drops_stale_entries() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "pages/main/Home.opwi", "Home", "main", "alice");
        write_doc(dir.path(), "pages/main/Gone.opwi", "Gone", "main", "alice");
        let mut index = DocumentIndex::new();
        index.rebuild(dir.path(), &ScanOptions::default()).unwrap();
        let path = dir.path().join("index/document_index.json");
        index.persist(&path).unwrap();

        fs::remove_file(dir.path().join("pages/main/Gone.opwi")).unwrap();
        let loaded = DocumentIndex::load(&path, dir.path()).unwrap();
        assert!(loaded.contains("main/Home"));
        assert!(!loaded.contains("main/Gone"));
    }

    #[test]
    fn load_missing_or_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        assert!(DocumentIndex::load(&path, dir.path()).unwrap().is_empty());
        fs::write(&path, "{ not json").unwrap();
        assert!(DocumentIndex::load(&path, dir.path()).unwrap().is_empty());
    }

    #[test]
    fn load_accepts_entries_without_document_id() {
        let dir = tempfile::tempdir().unwrap();
        write_doc(dir.path(), "pages/main/Home.opwi", "Home", "main", "alice");
        let json = r#"{
            "last_updated": "2024-05-01T10:00:00",
            "documents": {
                "main/Home": {
                    "title": "Home",
                    "path": "/pages/main/Home.opwi",
                    "namespace": "main",
                    "created_at": "2024-05-01T10:00:00",
                    "last_modified": "2024-05-01T10:00:00",
                    "revision_count": 1,
                    "contributors": ["alice"]
                }
            },
            "namespaces": {"main": {"path": "/pages/main", "description": "Main"}}
        }"#;
        let path = dir.path().join("index.json");
        fs::write(&path, json).unwrap();
        let loaded = DocumentIndex::load(&path, dir.path()).unwrap();
        assert_eq!(loaded.get("main/Home").unwrap().document_id, "");
        assert!(loaded.contains_path("pages/main/Home.opwi"));
        assert_eq!(loaded.find_by_path("/pages/main/Home.opwi").unwrap().0, "main/Home");
    }
}
