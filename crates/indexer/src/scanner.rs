use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::config::IndexConfig;

/// Scanner for finding indexable source files in a project.
pub struct FileScanner<'a> {
    root: PathBuf,
    config: &'a IndexConfig,
}

impl<'a> FileScanner<'a> {
    pub fn new(root: impl AsRef<Path>, config: &'a IndexConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
        }
    }

    /// Walk the tree and collect files whose extension is in the allow set,
    /// pruning any directory named in the ignore set.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let prune = self.config.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .sort_by_file_path(Ord::cmp)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                if !is_dir {
                    return true;
                }
                entry
                    .file_name()
                    .to_str()
                    .is_none_or(|name| !prune.is_ignored_dir(name))
            });

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|t| t.is_file()) {
                        continue;
                    }
                    let path = entry.path();
                    if self.is_indexable(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        log::debug!("Found {} indexable files", files.len());
        files
    }

    fn is_indexable(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.config.matches_extension(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::FileScanner;
    use crate::config::IndexConfig;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn skips_ignored_directories() {
        let temp = tempdir().unwrap();
        let modules = temp.path().join("node_modules").join("pkg");
        fs::create_dir_all(&modules).unwrap();
        fs::write(modules.join("index.js"), b"module.exports = 1;").unwrap();
        fs::write(temp.path().join("app.js"), b"const x = 1;").unwrap();

        let config = IndexConfig::default();
        let scanner = FileScanner::new(temp.path(), &config);
        let files = scanner.scan();

        assert!(files
            .iter()
            .all(|p| !p.to_string_lossy().contains("node_modules")));
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("app.js"));
    }

    #[test]
    fn skips_unknown_extensions() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("binary.exe"), b"\x00\x01").unwrap();
        fs::write(temp.path().join("main.py"), b"print('hi')").unwrap();

        let config = IndexConfig::default();
        let files = FileScanner::new(temp.path(), &config).scan();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("main.py"));
    }

    #[test]
    fn empty_project_scans_to_nothing() {
        let temp = tempdir().unwrap();
        let config = IndexConfig::default();
        assert!(FileScanner::new(temp.path(), &config).scan().is_empty());
    }
}
