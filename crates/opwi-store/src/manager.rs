use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use opwi_codec::{CorruptRecord, Decoded, OpwiCodec};
use opwi_document::{Document, DocumentValidator, UpdateOutcome, ValidationReport};
use opwi_index::{address_of, write_atomic, DocumentIndex, IndexEntry, RebuildReport};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::locks::DocumentLocks;
use crate::search::{match_document, match_title, rank, SearchHit, SearchScope};

/// Filesystem-backed document store.
///
/// Documents live at `<root>/<pages_dir>/<namespace>/<title>.<extension>`
/// and are addressed as `<namespace>/<title>`. All methods take `&self`;
/// writers to the same address are serialized by [`DocumentLocks`] and
/// index updates happen under the index write lock.
pub struct DocumentManager {
    config: StoreConfig,
    index: RwLock<DocumentIndex>,
    locks: DocumentLocks,
}

impl std::fmt::Debug for DocumentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentManager")
            .field("root", &self.config.root)
            .field("locked_addresses", &self.locks.len())
            .finish()
    }
}

impl DocumentManager {
    /// Open (or initialize) the store described by `config`.
    ///
    /// Creates the directory layout, loads the persisted index, rebuilds it
    /// from the document files, and writes it back.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(config.pages_path())?;
        let index_path = config.index_path();
        if let Some(dir) = index_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut index = DocumentIndex::load(&index_path, &config.root)?;
        let report = index.rebuild(&config.root, &config.scan_options())?;
        seed_namespaces(&mut index, &config);
        index.persist(&index_path)?;
        info!(
            root = %config.root.display(),
            documents = report.indexed,
            skipped = report.skipped.len(),
            "document store opened"
        );

        Ok(Self {
            config,
            index: RwLock::new(index),
            locks: DocumentLocks::new(),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ---- Writes ----

    /// Create a document at `<namespace>/<title>`.
    pub fn create(
        &self,
        title: &str,
        namespace: &str,
        content: &str,
        author: &str,
        origin_address: &str,
    ) -> StoreResult<Document> {
        // Validates title and namespace before they are used as path segments.
        let document = Document::create(title, namespace, content, author, origin_address)?;
        let address = address_of(namespace, title);

        self.locks.with_lock(&address, || {
            let path = self.config.document_path(namespace, title);
            let indexed = self.read_index()?.contains(&address);
            if indexed || path.exists() {
                return Err(StoreError::AlreadyExists(address.clone()));
            }
            self.write_document(&path, &document)?;

            let entry = IndexEntry::from_document(
                &document,
                self.config.relative_document_path(namespace, title),
            );
            let mut index = self.write_index()?;
            index.ensure_namespace(namespace, &self.config.pages_dir);
            index.insert(address.clone(), entry);
            index.persist(&self.config.index_path())?;

            info!(
                address = %address,
                doc_id = %document.doc_id(),
                author,
                "document created"
            );
            Ok(document)
        })
    }

    /// Record `content` as the new text of the document at `address`.
    ///
    /// [`UpdateOutcome::NoChange`] leaves both the file and the index untouched.
    /// A file with skipped records is refused with [`StoreError::Damaged`].
    pub fn update(
        &self,
        address: &str,
        content: &str,
        author: &str,
        origin_address: &str,
    ) -> StoreResult<UpdateOutcome> {
        self.locks.with_lock(address, || {
            let entry = self.require_entry(address)?;
            let path = entry.file_path(&self.config.root);
            let mut document = self.read_writable(&path, address)?;

            let outcome = document.update(content, author, origin_address)?;
            let UpdateOutcome::Applied(revision) = &outcome else {
                debug!(address, author, "update skipped, content unchanged");
                return Ok(outcome);
            };

            self.write_document(&path, &document)?;
            let mut index = self.write_index()?;
            match index.get_mut(address) {
                Some(entry) => entry.record_revision(&document),
                None => index.insert(address, IndexEntry::from_document(&document, entry.path)),
            }
            index.persist(&self.config.index_path())?;

            info!(
                address,
                revision = %revision.revision_id().short_hex(),
                author,
                revisions = document.revision_count(),
                "document updated"
            );
            Ok(outcome)
        })
    }

    /// Replace the tags and category of a document. Revisions are untouched.
    pub fn update_metadata(
        &self,
        address: &str,
        tags: Vec<String>,
        category: &str,
    ) -> StoreResult<Document> {
        self.locks.with_lock(address, || {
            let entry = self.require_entry(address)?;
            let path = entry.file_path(&self.config.root);
            let mut document = self.read_writable(&path, address)?;
            document.set_tags(tags);
            document.set_category(category);
            self.write_document(&path, &document)?;
            info!(address, tags = ?document.tags(), category, "document metadata updated");
            Ok(document)
        })
    }

    /// Rewrite the file at `address` from the revisions that decode, dropping
    /// every record the decoder skipped. Returns the dropped records.
    pub fn repair(&self, address: &str) -> StoreResult<Vec<CorruptRecord>> {
        self.locks.with_lock(address, || {
            let entry = self.require_entry(address)?;
            let path = entry.file_path(&self.config.root);
            let Decoded { document, warnings } = self.read_decoded(&path, address)?;
            let dropped: Vec<CorruptRecord> = warnings
                .into_iter()
                .filter(|w| w.kind.drops_data())
                .collect();
            if dropped.is_empty() {
                return Ok(dropped);
            }

            self.write_document(&path, &document)?;
            let mut index = self.write_index()?;
            match index.get_mut(address) {
                Some(entry) => entry.record_revision(&document),
                None => index.insert(address, IndexEntry::from_document(&document, entry.path)),
            }
            index.persist(&self.config.index_path())?;

            warn!(
                address,
                dropped = dropped.len(),
                revisions = document.revision_count(),
                "document repaired"
            );
            Ok(dropped)
        })
    }

    // ---- Reads ----

    /// The document at `address`. Skipped records are logged but not
    /// returned; use [`DocumentManager::get_decoded`] to inspect them.
    pub fn get(&self, address: &str) -> StoreResult<Document> {
        Ok(self.get_decoded(address)?.document)
    }

    /// The document at `address` together with the records its decoder skipped.
    pub fn get_decoded(&self, address: &str) -> StoreResult<Decoded> {
        let entry = self.require_entry(address)?;
        self.read_decoded(&entry.file_path(&self.config.root), address)
    }

    /// Look a document up by its root-relative storage path.
    pub fn get_by_path(&self, path: &str) -> StoreResult<Document> {
        let address = self
            .read_index()?
            .find_by_path(path)
            .map(|(address, _)| address.to_string())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
        self.get(&address)
    }

    pub fn entry(&self, address: &str) -> StoreResult<Option<IndexEntry>> {
        Ok(self.read_index()?.get(address).cloned())
    }

    /// All index entries, optionally restricted to one namespace, in address order.
    pub fn list(&self, namespace: Option<&str>) -> StoreResult<Vec<(String, IndexEntry)>> {
        let index = self.read_index()?;
        Ok(index
            .entries()
            .filter(|(_, e)| namespace.map_or(true, |ns| e.namespace == ns))
            .map(|(a, e)| (a.to_string(), e.clone()))
            .collect())
    }

    /// Case-insensitive substring search. An empty query matches nothing.
    pub fn search(&self, query: &str, scope: SearchScope) -> StoreResult<Vec<SearchHit>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits = Vec::new();
        for (address, entry) in self.list(None)? {
            let kind = if scope.needs_document() {
                match self.read_document(&entry.file_path(&self.config.root), &address) {
                    Ok(document) => match_document(&query, &document, scope),
                    Err(e) => {
                        warn!(address = %address, error = %e, "search skipping unreadable document");
                        continue;
                    }
                }
            } else {
                match_title(&query, &entry.title)
            };
            if let Some(kind) = kind {
                hits.push(SearchHit {
                    address,
                    title: entry.title,
                    namespace: entry.namespace,
                    kind,
                });
            }
        }
        rank(&mut hits);
        debug!(query = %query, hits = hits.len(), "search finished");
        Ok(hits)
    }

    /// Check the integrity of the stored document at `address`.
    pub fn verify(&self, address: &str) -> StoreResult<ValidationReport> {
        let document = self.get(address)?;
        Ok(DocumentValidator::validate(&document))
    }

    // ---- Maintenance ----

    /// Regenerate the index from the document files and persist it.
    pub fn rebuild_index(&self) -> StoreResult<RebuildReport> {
        let mut index = self.write_index()?;
        let report = index.rebuild(&self.config.root, &self.config.scan_options())?;
        seed_namespaces(&mut index, &self.config);
        index.persist(&self.config.index_path())?;
        Ok(report)
    }

    // ---- Internals ----

    fn require_entry(&self, address: &str) -> StoreResult<IndexEntry> {
        self.read_index()?
            .get(address)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(address.to_string()))
    }

    fn read_decoded(&self, path: &Path, address: &str) -> StoreResult<Decoded> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(address.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(OpwiCodec::deserialize(&text)?)
    }

    fn read_document(&self, path: &Path, address: &str) -> StoreResult<Document> {
        Ok(self.read_decoded(path, address)?.document)
    }

    /// Read a document that is about to be written back. Refuses files whose
    /// re-encoding would lose skipped records.
    fn read_writable(&self, path: &Path, address: &str) -> StoreResult<Document> {
        let decoded = self.read_decoded(path, address)?;
        if decoded.is_lossless() {
            return Ok(decoded.document);
        }
        let records: Vec<CorruptRecord> = decoded.dropped().cloned().collect();
        warn!(address, records = records.len(), "refusing to rewrite damaged document");
        Err(StoreError::Damaged {
            address: address.to_string(),
            records,
        })
    }

    fn write_document(&self, path: &Path, document: &Document) -> StoreResult<()> {
        let text = OpwiCodec::serialize(document)?;
        write_atomic(path, text.as_bytes())?;
        Ok(())
    }

    fn read_index(&self) -> StoreResult<RwLockReadGuard<'_, DocumentIndex>> {
        self.index
            .read()
            .map_err(|_| StoreError::LockPoisoned("document index"))
    }

    fn write_index(&self) -> StoreResult<RwLockWriteGuard<'_, DocumentIndex>> {
        self.index
            .write()
            .map_err(|_| StoreError::LockPoisoned("document index"))
    }
}

/// Register configured namespaces, filling in descriptions that are still empty.
fn seed_namespaces(index: &mut DocumentIndex, config: &StoreConfig) {
    for (name, namespace) in &config.namespaces {
        let described = index
            .namespaces()
            .get(name)
            .is_some_and(|entry| !entry.description.is_empty());
        if !described {
            index.describe_namespace(name, &config.pages_dir, &namespace.description);
        }
    }
}
