use std::collections::HashSet;
use std::env;

const DEFAULT_IGNORED_DIRS: &[&str] = &[
    // VCS / tooling
    ".git",
    ".svn",
    ".idea",
    ".vscode",
    // our own state and the assistants' config folders
    ".ctxslim",
    ".claude",
    ".gemini",
    // caches / builds
    "node_modules",
    "venv",
    ".venv",
    "env",
    "__pycache__",
    "dist",
    "build",
    "target",
    ".eggs",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
];

const DEFAULT_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "go", "rs", "java", "rb", "php", "swift", "kt", "c", "cpp",
    "h", "css", "scss", "html", "vue", "svelte", "sql", "graphql", "proto", "yaml", "yml", "toml",
    "json", "md", "txt", "env", "sh", "bash", "zsh", "dockerfile",
];

/// Which directories to prune and which file extensions to index.
///
/// Built once per run (defaults, then environment overrides) and passed by
/// reference into the scanner and the index builder.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub ignored_dirs: HashSet<String>,
    pub extensions: HashSet<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(|s| (*s).to_string()).collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl IndexConfig {
    /// Defaults with `CTXSLIM_IGNORE_DIRS` / `CTXSLIM_EXTENSIONS` applied.
    ///
    /// Both variables are comma-separated lists and replace the corresponding
    /// default set entirely when present and non-empty.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dirs) = read_csv_var("CTXSLIM_IGNORE_DIRS") {
            config.ignored_dirs = dirs;
        }
        if let Some(exts) = read_csv_var("CTXSLIM_EXTENSIONS") {
            config.extensions = exts
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect();
        }
        config
    }

    #[must_use]
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored_dirs.contains(name)
    }

    #[must_use]
    pub fn matches_extension(&self, ext: &str) -> bool {
        self.extensions.contains(&ext.to_lowercase())
    }
}

fn read_csv_var(name: &str) -> Option<HashSet<String>> {
    let raw = env::var(name).ok()?;
    let parsed: HashSet<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if parsed.is_empty() {
        None
    } else {
        Some(parsed)
    }
}
