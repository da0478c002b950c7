use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

// Surface-level pattern matching only. This is deliberately approximate:
// imports are recorded as raw target strings, never resolved to paths.
static PY_IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:from\s+([\w.]+)\s+import|import\s+([\w.]+))").unwrap());
static JS_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:import\s+.*?from\s+['"]([^'"]+)['"]|require\s*\(\s*['"]([^'"]+)['"]\s*\))"#)
        .unwrap()
});
static PY_EXPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?:def\s+(\w+)|class\s+(\w+))").unwrap());
static JS_EXPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"export\s+(?:default\s+)?(?:function|class|const|let|var)\s+(\w+)").unwrap()
});

/// Source-file families with known import/export patterns.
///
/// Files outside these families get empty import and export lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFamily {
    Python,
    JavaScript,
}

impl SourceFamily {
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "py" | "pyw" => Some(Self::Python),
            "js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            _ => None,
        }
    }
}

/// Extract raw import targets from file content.
#[must_use]
pub fn detect_imports(content: &str, family: Option<SourceFamily>) -> Vec<String> {
    let regex = match family {
        Some(SourceFamily::Python) => &PY_IMPORT_RE,
        Some(SourceFamily::JavaScript) => &JS_IMPORT_RE,
        None => return Vec::new(),
    };
    regex
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extract exported top-level names from file content.
#[must_use]
pub fn detect_exports(content: &str, family: Option<SourceFamily>) -> Vec<String> {
    match family {
        Some(SourceFamily::Python) => PY_EXPORT_RE
            .captures_iter(content)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().to_string())
            .filter(|name| !name.starts_with('_'))
            .collect(),
        Some(SourceFamily::JavaScript) => JS_EXPORT_RE
            .captures_iter(content)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect(),
        None => Vec::new(),
    }
}

/// Infer a module name from a relative path.
///
/// Files directly at the root map to the sentinel `"root"`; paths rooted
/// under `src/` skip that segment and use the next one.
#[must_use]
pub fn infer_module(rel_path: &str) -> String {
    let parts: Vec<&str> = Path::new(rel_path)
        .components()
        .filter_map(|c| c.as_os_str().to_str())
        .collect();
    match parts.as_slice() {
        [] | [_] => "root".to_string(),
        ["src", module, _, ..] => (*module).to_string(),
        [first, ..] => (*first).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn python_imports_both_forms() {
        let content = "import os\nfrom auth.login import login_user\nimport database\n";
        let imports = detect_imports(content, Some(SourceFamily::Python));
        assert_eq!(imports, vec!["os", "auth.login", "database"]);
    }

    #[test]
    fn javascript_imports_and_requires() {
        let content = "import { api } from './api/client'\nconst db = require('../db')\n";
        let imports = detect_imports(content, Some(SourceFamily::JavaScript));
        assert_eq!(imports, vec!["./api/client", "../db"]);
    }

    #[test]
    fn python_exports_skip_private_names() {
        let content = "def login_user():\n    pass\n\ndef _helper():\n    pass\n\nclass Session:\n    pass\n";
        let exports = detect_exports(content, Some(SourceFamily::Python));
        assert_eq!(exports, vec!["login_user", "Session"]);
    }

    #[test]
    fn javascript_exports() {
        let content = "export default function App() {}\nexport const VERSION = '1';\n";
        let exports = detect_exports(content, Some(SourceFamily::JavaScript));
        assert_eq!(exports, vec!["App", "VERSION"]);
    }

    #[test]
    fn unknown_family_yields_empty_lists() {
        let content = "mod auth;\nuse crate::db;\n";
        assert!(detect_imports(content, None).is_empty());
        assert!(detect_exports(content, None).is_empty());
    }

    #[test]
    fn module_inference_follows_path_shape() {
        assert_eq!(infer_module("README.md"), "root");
        assert_eq!(infer_module("src/auth/login.py"), "auth");
        assert_eq!(infer_module("src/main.py"), "src");
        assert_eq!(infer_module("api/users.py"), "api");
    }

    #[test]
    fn family_from_extension() {
        use std::path::Path;
        assert_eq!(
            SourceFamily::from_path(Path::new("a/b.py")),
            Some(SourceFamily::Python)
        );
        assert_eq!(
            SourceFamily::from_path(Path::new("a/b.tsx")),
            Some(SourceFamily::JavaScript)
        );
        assert_eq!(SourceFamily::from_path(Path::new("a/b.rs")), None);
    }
}
