use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::IndexConfig;
use crate::detect::{detect_exports, detect_imports, infer_module, SourceFamily};
use crate::error::{IndexerError, Result};
use crate::index::{CodebaseIndex, FileRecord};
use crate::scanner::FileScanner;
use crate::{INDEX_FILE, STATE_DIR};

/// Builds, loads, and incrementally refreshes the persisted codebase index.
pub struct IndexStore {
    root: PathBuf,
    path: PathBuf,
}

impl IndexStore {
    /// Create a store for the project rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::InvalidPath`] when `root` is not a directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "not a directory: {}",
                root.display()
            )));
        }
        let path = root.join(STATE_DIR).join(INDEX_FILE);
        Ok(Self { root, path })
    }

    #[must_use]
    pub fn index_path(&self) -> &Path {
        &self.path
    }

    /// Walk the project and build a fresh index, persisting it atomically.
    ///
    /// Unreadable files are skipped; decode errors are tolerated by lossy
    /// UTF-8 conversion.
    ///
    /// # Errors
    ///
    /// Returns an error only when the final persist fails.
    pub fn build(&self, config: &IndexConfig) -> Result<CodebaseIndex> {
        let mut index = CodebaseIndex {
            indexed_at: unix_now_ms(),
            ..CodebaseIndex::default()
        };

        for abs_path in FileScanner::new(&self.root, config).scan() {
            let Ok(rel) = abs_path.strip_prefix(&self.root) else {
                continue;
            };
            let rel = rel.to_string_lossy().replace('\\', "/");

            let bytes = match fs::read(&abs_path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::debug!("Skipping unreadable file {rel}: {e}");
                    continue;
                }
            };
            let content = String::from_utf8_lossy(&bytes);

            let family = SourceFamily::from_path(&abs_path);
            let record = FileRecord {
                purpose: String::new(),
                module: infer_module(&rel),
                imports: detect_imports(&content, family),
                exports: detect_exports(&content, family),
                token_count: ctxslim_tokens::count(&content) as u64,
                last_modified: mtime_ms(&abs_path),
                summary: String::new(),
            };
            index.files.insert(rel, record);
        }

        index.rebuild_module_groups();
        index.recompute_totals();
        self.persist(&index)?;

        log::info!(
            "Indexed {} files ({} tokens if read in full)",
            index.total_files,
            index.total_tokens_if_full_read
        );
        Ok(index)
    }

    /// Load the persisted index.
    ///
    /// A missing or unparsable file yields a well-formed empty index; callers
    /// treat "no index yet" as a normal state.
    #[must_use]
    pub fn load(&self) -> CodebaseIndex {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return CodebaseIndex::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(index) => index,
            Err(e) => {
                log::warn!("Index file is unparsable ({e}); starting from an empty index");
                CodebaseIndex::default()
            }
        }
    }

    /// Refresh the records for the given relative paths after a change.
    ///
    /// Only token counts are recomputed; recorded imports and exports go
    /// stale until the next full build. Records for files that no longer
    /// exist are dropped. Totals are recomputed from scratch and the index
    /// is re-persisted atomically.
    ///
    /// # Errors
    ///
    /// Returns an error only when the persist fails.
    pub fn reindex_files(&self, paths: &[String]) -> Result<CodebaseIndex> {
        let mut index = self.load();

        for rel in paths {
            let abs_path = self.root.join(rel);
            if !abs_path.exists() {
                index.files.remove(rel);
                continue;
            }

            let bytes = match fs::read(&abs_path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    log::debug!("Skipping unreadable file {rel}: {e}");
                    continue;
                }
            };
            let content = String::from_utf8_lossy(&bytes);
            let tokens = ctxslim_tokens::count(&content) as u64;

            let entry = index.files.entry(rel.clone()).or_insert_with(|| FileRecord {
                module: infer_module(rel),
                ..FileRecord::default()
            });
            entry.token_count = tokens;
            entry.last_modified = mtime_ms(&abs_path);
        }

        index.rebuild_module_groups();
        index.recompute_totals();
        index.indexed_at = unix_now_ms();
        self.persist(&index)?;
        Ok(index)
    }

    /// Atomic replace: write to a temp file in the state directory, then
    /// rename over the target, so a crash mid-write never corrupts the
    /// previous good index.
    fn persist(&self, index: &CodebaseIndex) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(index)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

fn mtime_ms(path: &Path) -> u64 {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(|modified| {
            modified
                .duration_since(UNIX_EPOCH)
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
                .unwrap_or(0)
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::IndexStore;
    use crate::config::IndexConfig;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn seed_two_file_project(root: &std::path::Path) {
        let auth = root.join("src").join("auth");
        let api = root.join("src").join("api");
        fs::create_dir_all(&auth).unwrap();
        fs::create_dir_all(&api).unwrap();
        fs::write(
            auth.join("login.py"),
            "import database\n\ndef login_user():\n    pass\n",
        )
        .unwrap();
        fs::write(
            api.join("users.py"),
            "from auth.login import login_user\n\ndef list_users():\n    pass\n",
        )
        .unwrap();
    }

    #[test]
    fn builds_records_with_modules_and_imports() {
        let temp = tempdir().unwrap();
        seed_two_file_project(temp.path());

        let store = IndexStore::new(temp.path()).unwrap();
        let index = store.build(&IndexConfig::default()).unwrap();

        assert_eq!(index.total_files, 2);
        assert_eq!(index.total_files, index.files.len() as u64);
        assert_eq!(
            index.total_tokens_if_full_read,
            index.files.values().map(|f| f.token_count).sum::<u64>()
        );

        let login = &index.files["src/auth/login.py"];
        assert_eq!(login.module, "auth");
        assert_eq!(login.imports, vec!["database"]);
        assert_eq!(login.exports, vec!["login_user"]);

        let users = &index.files["src/api/users.py"];
        assert_eq!(users.module, "api");
        assert_eq!(users.imports, vec!["auth.login"]);

        assert_eq!(index.modules["auth"], vec!["src/auth/login.py"]);
        assert_eq!(index.modules["api"], vec!["src/api/users.py"]);
    }

    #[test]
    fn indexing_twice_is_idempotent() {
        let temp = tempdir().unwrap();
        seed_two_file_project(temp.path());

        let store = IndexStore::new(temp.path()).unwrap();
        let first = store.build(&IndexConfig::default()).unwrap();
        let second = store.build(&IndexConfig::default()).unwrap();

        assert_eq!(first.total_files, second.total_files);
        assert_eq!(
            first.total_tokens_if_full_read,
            second.total_tokens_if_full_read
        );
        assert_eq!(first.files, second.files);
    }

    #[test]
    fn load_without_index_returns_empty() {
        let temp = tempdir().unwrap();
        let store = IndexStore::new(temp.path()).unwrap();
        let index = store.load();
        assert_eq!(index.total_files, 0);
        assert_eq!(index.total_tokens_if_full_read, 0);
        assert!(index.files.is_empty());
    }

    #[test]
    fn load_tolerates_corrupt_index() {
        let temp = tempdir().unwrap();
        let store = IndexStore::new(temp.path()).unwrap();
        fs::create_dir_all(store.index_path().parent().unwrap()).unwrap();
        fs::write(store.index_path(), b"{not json").unwrap();

        let index = store.load();
        assert_eq!(index.total_files, 0);
    }

    #[test]
    fn ignored_directories_never_reach_the_index() {
        let temp = tempdir().unwrap();
        seed_two_file_project(temp.path());
        let vendored = temp.path().join("node_modules").join("lib");
        fs::create_dir_all(&vendored).unwrap();
        fs::write(vendored.join("index.js"), "module.exports = 1;\n").unwrap();

        let store = IndexStore::new(temp.path()).unwrap();
        let index = store.build(&IndexConfig::default()).unwrap();

        assert!(index
            .files
            .keys()
            .all(|path| !path.starts_with("node_modules")));
    }

    #[test]
    fn partial_reindex_refreshes_and_removes() {
        let temp = tempdir().unwrap();
        seed_two_file_project(temp.path());

        let store = IndexStore::new(temp.path()).unwrap();
        let built = store.build(&IndexConfig::default()).unwrap();
        let old_tokens = built.files["src/auth/login.py"].token_count;

        fs::write(
            temp.path().join("src/auth/login.py"),
            "import database\nimport sessions\n\ndef login_user():\n    pass\n\ndef logout_user():\n    pass\n",
        )
        .unwrap();
        fs::remove_file(temp.path().join("src/api/users.py")).unwrap();

        let updated = store
            .reindex_files(&[
                "src/auth/login.py".to_string(),
                "src/api/users.py".to_string(),
            ])
            .unwrap();

        assert!(updated.files["src/auth/login.py"].token_count > old_tokens);
        // imports stay as recorded at build time
        assert_eq!(updated.files["src/auth/login.py"].imports, vec!["database"]);
        assert!(!updated.files.contains_key("src/api/users.py"));
        assert_eq!(updated.total_files, 1);
        assert_eq!(
            updated.total_tokens_if_full_read,
            updated.files["src/auth/login.py"].token_count
        );
    }
}
