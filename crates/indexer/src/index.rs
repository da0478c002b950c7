use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One indexed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    #[serde(default)]
    pub purpose: String,
    pub module: String,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub exports: Vec<String>,
    pub token_count: u64,
    /// Unix milliseconds of the file's mtime at index time.
    pub last_modified: u64,
    #[serde(default)]
    pub summary: String,
}

/// The durable per-project map of every tracked file's metadata.
///
/// `total_files` and `total_tokens_if_full_read` are derived values and are
/// recomputed after every mutation rather than adjusted in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodebaseIndex {
    /// Unix milliseconds of the last full or partial index pass.
    pub indexed_at: u64,
    pub total_files: u64,
    pub total_tokens_if_full_read: u64,
    #[serde(default)]
    pub files: BTreeMap<String, FileRecord>,
    #[serde(default)]
    pub modules: BTreeMap<String, Vec<String>>,
}

impl CodebaseIndex {
    /// Recompute the aggregate totals from the file map.
    pub fn recompute_totals(&mut self) {
        self.total_files = self.files.len() as u64;
        self.total_tokens_if_full_read = self.files.values().map(|f| f.token_count).sum();
    }

    /// Rebuild the module → member-paths grouping from the file map.
    pub fn rebuild_module_groups(&mut self) {
        self.modules.clear();
        for (path, record) in &self.files {
            self.modules
                .entry(record.module.clone())
                .or_default()
                .push(path.clone());
        }
    }
}

/// Cheap per-file entry inside an [`IndexDigest`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileDigest {
    pub purpose: String,
    pub module: String,
}

/// A serializable summary of the index for the classifier request.
///
/// Deliberately carries no file contents so the classification call itself
/// stays cheap.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexDigest {
    pub modules: BTreeMap<String, Vec<String>>,
    pub files: BTreeMap<String, FileDigest>,
}

impl IndexDigest {
    #[must_use]
    pub fn from_index(index: &CodebaseIndex) -> Self {
        Self {
            modules: index.modules.clone(),
            files: index
                .files
                .iter()
                .map(|(path, record)| {
                    (
                        path.clone(),
                        FileDigest {
                            purpose: record.purpose.clone(),
                            module: record.module.clone(),
                        },
                    )
                })
                .collect(),
        }
    }
}
