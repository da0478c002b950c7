use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ctxslim_indexer::CodebaseIndex;
use ctxslim_intent::ChangeIntent;
use ctxslim_memory::MemoryRecord;

use crate::compress::compress_content;
use crate::package::ContextPackage;

const DEFAULT_TOKEN_THRESHOLD: u64 = 2000;

/// Token budget for one context package.
#[derive(Debug, Clone, Copy)]
pub struct SelectorConfig {
    /// Above this total, the one-shot compression pass runs.
    pub token_threshold: u64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            token_threshold: DEFAULT_TOKEN_THRESHOLD,
        }
    }
}

impl SelectorConfig {
    /// Default threshold with `CTXSLIM_TOKEN_THRESHOLD` applied.
    #[must_use]
    pub fn from_env() -> Self {
        let token_threshold = env::var("CTXSLIM_TOKEN_THRESHOLD")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_TOKEN_THRESHOLD);
        Self { token_threshold }
    }
}

/// Assembles the minimal file/summary/decision bundle for one change.
pub struct ContextSelector {
    root: PathBuf,
    config: SelectorConfig,
}

impl ContextSelector {
    pub fn new(root: impl AsRef<Path>, config: SelectorConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
        }
    }

    /// Build the context package for a classified change.
    ///
    /// Missing files are skipped silently; the working set grows by exactly
    /// one import hop. If the loaded total exceeds the threshold, every file
    /// is compressed once and the total recomputed; the result is not
    /// guaranteed to land under the threshold.
    #[must_use]
    pub fn select(
        &self,
        intent: &ChangeIntent,
        index: &CodebaseIndex,
        memory: &MemoryRecord,
    ) -> ContextPackage {
        let working = self.expand_imports(&intent.affected_files, index);

        let mut package = ContextPackage {
            intent: intent.clone(),
            ..ContextPackage::default()
        };

        let mut total_tokens: u64 = 0;
        for rel in &working {
            let abs_path = self.root.join(rel);
            let Ok(bytes) = fs::read(&abs_path) else {
                log::debug!("Skipping missing or unreadable file {rel}");
                continue;
            };
            let content = String::from_utf8_lossy(&bytes).into_owned();
            total_tokens += ctxslim_tokens::count(&content) as u64;
            package.files.insert(rel.clone(), content);
        }

        for module in &intent.affected_modules {
            package
                .module_summaries
                .insert(module.clone(), summarize_module(module, index));
        }

        package.decisions = memory.decisions_for_modules(&intent.affected_modules);

        if total_tokens > self.config.token_threshold {
            log::debug!(
                "Context total {total_tokens} exceeds threshold {}; compressing",
                self.config.token_threshold
            );
            total_tokens = 0;
            for content in package.files.values_mut() {
                *content = compress_content(content, true);
                total_tokens += ctxslim_tokens::count(content) as u64;
            }
        }

        package.total_tokens = total_tokens;
        package
    }

    /// One-level import expansion: for every affected file, add the first
    /// indexed path that textually contains each recorded import target
    /// (dotted or slashed). A single hop, never transitive closure.
    fn expand_imports(&self, affected: &[String], index: &CodebaseIndex) -> BTreeSet<String> {
        let mut working: BTreeSet<String> = affected.iter().cloned().collect();

        for rel in affected {
            let Some(record) = index.files.get(rel) else {
                continue;
            };
            for import in &record.imports {
                let slashed = import.replace('.', "/");
                let hit = index
                    .files
                    .keys()
                    .find(|path| path.contains(&slashed) || path.contains(import.as_str()));
                if let Some(path) = hit {
                    working.insert(path.clone());
                }
            }
        }

        working
    }
}

fn summarize_module(module: &str, index: &CodebaseIndex) -> String {
    let Some(members) = index.modules.get(module).filter(|m| !m.is_empty()) else {
        return "no files".to_string();
    };

    let lines: Vec<String> = members
        .iter()
        .map(|path| {
            let (purpose, tokens) = index
                .files
                .get(path)
                .map(|record| (record.purpose.as_str(), record.token_count))
                .unwrap_or(("", 0));
            format!("- {path}: {purpose} ({tokens} tokens)")
        })
        .collect();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxslim_indexer::{IndexConfig, IndexStore};
    use ctxslim_intent::ChangeIntent;
    use ctxslim_memory::MemoryRecord;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    const LOGIN_PY: &str = "import database\n\ndef login_user():\n    pass\n";
    const USERS_PY: &str = "from auth.login import login_user\n\ndef list_users():\n    pass\n";

    fn seed_project(root: &Path) -> CodebaseIndex {
        fs::create_dir_all(root.join("src/auth")).unwrap();
        fs::create_dir_all(root.join("src/api")).unwrap();
        fs::write(root.join("src/auth/login.py"), LOGIN_PY).unwrap();
        fs::write(root.join("src/api/users.py"), USERS_PY).unwrap();
        IndexStore::new(root)
            .unwrap()
            .build(&IndexConfig::default())
            .unwrap()
    }

    fn intent_for(modules: &[&str], files: &[&str]) -> ChangeIntent {
        ChangeIntent {
            affected_modules: modules.iter().map(|s| (*s).to_string()).collect(),
            affected_files: files.iter().map(|s| (*s).to_string()).collect(),
            ..ChangeIntent::default()
        }
    }

    #[test]
    fn selects_affected_file_with_summary_and_exact_total() {
        let temp = tempdir().unwrap();
        let index = seed_project(temp.path());
        let memory = MemoryRecord::new("demo", 1);

        let intent = intent_for(&["auth"], &["src/auth/login.py"]);
        let selector = ContextSelector::new(temp.path(), SelectorConfig::default());
        let package = selector.select(&intent, &index, &memory);

        assert_eq!(package.files["src/auth/login.py"], LOGIN_PY);
        assert!(package.module_summaries["auth"].contains("- src/auth/login.py:"));
        let expected: u64 = package
            .files
            .values()
            .map(|c| ctxslim_tokens::count(c) as u64)
            .sum();
        assert_eq!(package.total_tokens, expected);
    }

    #[test]
    fn import_expansion_pulls_in_one_hop() {
        let temp = tempdir().unwrap();
        let index = seed_project(temp.path());
        let memory = MemoryRecord::new("demo", 1);

        // users.py imports auth.login, so login.py rides along
        let intent = intent_for(&["api"], &["src/api/users.py"]);
        let selector = ContextSelector::new(temp.path(), SelectorConfig::default());
        let package = selector.select(&intent, &index, &memory);

        assert!(package.files.contains_key("src/api/users.py"));
        assert!(package.files.contains_key("src/auth/login.py"));
        assert_eq!(package.files.len(), 2);
    }

    #[test]
    fn decisions_filter_by_affected_modules() {
        let temp = tempdir().unwrap();
        let index = seed_project(temp.path());
        let mut memory = MemoryRecord::new("demo", 1);
        memory.add_decision("use argon2", "bcrypt is slower", vec!["auth".to_string()], 2);
        memory.add_decision("paginate", "payload size", vec!["api".to_string()], 3);

        let intent = intent_for(&["auth"], &["src/auth/login.py"]);
        let selector = ContextSelector::new(temp.path(), SelectorConfig::default());
        let package = selector.select(&intent, &index, &memory);

        assert_eq!(package.decisions.len(), 1);
        assert_eq!(package.decisions[0].decision, "use argon2");
    }

    #[test]
    fn over_threshold_content_is_compressed_once() {
        let temp = tempdir().unwrap();
        let index = seed_project(temp.path());
        let memory = MemoryRecord::new("demo", 1);

        let intent = intent_for(&["auth"], &["src/auth/login.py"]);
        let selector = ContextSelector::new(temp.path(), SelectorConfig { token_threshold: 1 });
        let package = selector.select(&intent, &index, &memory);

        let compressed = compress_content(LOGIN_PY, true);
        assert_eq!(package.files["src/auth/login.py"], compressed);
        assert_eq!(
            package.total_tokens,
            ctxslim_tokens::count(&compressed) as u64
        );
    }

    #[test]
    fn missing_files_are_skipped_silently() {
        let temp = tempdir().unwrap();
        let index = seed_project(temp.path());
        let memory = MemoryRecord::new("demo", 1);

        let intent = intent_for(&[], &["src/auth/login.py", "src/gone/old.py"]);
        let selector = ContextSelector::new(temp.path(), SelectorConfig::default());
        let package = selector.select(&intent, &index, &memory);

        assert_eq!(package.files.len(), 1);
        assert!(package.files.contains_key("src/auth/login.py"));
    }

    #[test]
    fn empty_purpose_renders_verbatim_in_summaries() {
        let temp = tempdir().unwrap();
        let index = seed_project(temp.path());
        let memory = MemoryRecord::new("demo", 1);

        let intent = intent_for(&["auth"], &["src/auth/login.py"]);
        let selector = ContextSelector::new(temp.path(), SelectorConfig::default());
        let package = selector.select(&intent, &index, &memory);

        // freshly indexed files have no purpose; the blank carries through
        let summary = &package.module_summaries["auth"];
        assert!(summary.contains("- src/auth/login.py:  ("));
        assert!(!summary.contains("no description"));
    }

    #[test]
    fn unknown_module_summary_is_a_placeholder() {
        let temp = tempdir().unwrap();
        let index = seed_project(temp.path());
        let memory = MemoryRecord::new("demo", 1);

        let intent = intent_for(&["billing"], &[]);
        let selector = ContextSelector::new(temp.path(), SelectorConfig::default());
        let package = selector.select(&intent, &index, &memory);

        assert_eq!(package.module_summaries["billing"], "no files");
    }
}
