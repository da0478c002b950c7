use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

static PY_BLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)(""".*?"""|'''.*?''')"#).unwrap());
static JS_BLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static HASH_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#[^\n]*").unwrap());
static SLASH_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"//[^\n]*").unwrap());
static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Lossy, one-shot compression: strip block/doc comments, optionally line
/// comments, and collapse runs of blank lines.
///
/// Pattern-based, language-agnostic, and knowingly approximate; it may eat a
/// `#` inside a string literal. Applied at most once per context build.
#[must_use]
pub fn compress_content(text: &str, aggressive: bool) -> String {
    let mut result = PY_BLOCK_RE.replace_all(text, "").into_owned();
    result = JS_BLOCK_RE.replace_all(&result, "").into_owned();

    if aggressive {
        result = HASH_LINE_RE.replace_all(&result, "").into_owned();
        result = SLASH_LINE_RE.replace_all(&result, "").into_owned();
    }

    result = BLANK_RUN_RE.replace_all(&result, "\n\n").into_owned();
    let mut out = result.trim().to_string();
    out.push('\n');
    out
}

/// Local, no-AI synopsis of a source file: name, token count, and the first
/// line that is neither a comment nor an import.
#[must_use]
pub fn file_synopsis(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let Ok(bytes) = std::fs::read(path) else {
        return format!("Could not read {name}.");
    };
    let content = String::from_utf8_lossy(&bytes);

    let lines: Vec<&str> = content.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        return format!("{name} is empty.");
    }

    let purpose_line = lines
        .iter()
        .find(|line| {
            !["#", "//", "/*", "'''", "\"\"\"", "import", "from"]
                .iter()
                .any(|prefix| line.starts_with(prefix))
        })
        .map(|line| line.chars().take(120).collect::<String>())
        .unwrap_or_default();

    let tokens = ctxslim_tokens::count(&content);
    format!("{name} ({tokens} tokens). {purpose_line}")
}
