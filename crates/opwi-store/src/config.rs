use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use opwi_index::{relative_path, ScanOptions};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Storage layout and seeded namespaces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Storage root; everything else is relative to it.
    pub root: PathBuf,
    pub pages_dir: String,
    pub index_file: String,
    /// Document file extension, without the dot.
    pub extension: String,
    /// Namespaces registered in the index on open, with their descriptions.
    pub namespaces: BTreeMap<String, NamespaceConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    #[serde(default)]
    pub description: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let mut namespaces = BTreeMap::new();
        namespaces.insert(
            "main".to_string(),
            NamespaceConfig {
                description: "Main namespace".into(),
            },
        );
        Self {
            root: PathBuf::from("."),
            pages_dir: "pages".into(),
            index_file: "index/document_index.json".into(),
            extension: "opwi".into(),
            namespaces,
        }
    }
}

impl StoreConfig {
    /// Default layout under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> StoreResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string(self).map_err(|e| StoreError::Config(e.to_string()))
    }

    pub fn pages_path(&self) -> PathBuf {
        self.root.join(&self.pages_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index_file)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            pages_dir: self.pages_dir.clone(),
            extension: self.extension.clone(),
        }
    }

    /// Root-relative path of a document, as recorded in the index.
    pub fn relative_document_path(&self, namespace: &str, title: &str) -> String {
        relative_path(&self.pages_dir, namespace, title, &self.extension)
    }

    pub fn document_path(&self, namespace: &str, title: &str) -> PathBuf {
        self.root.join(self.relative_document_path(namespace, title))
    }
}
