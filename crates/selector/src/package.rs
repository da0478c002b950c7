use std::collections::BTreeMap;

use ctxslim_intent::ChangeIntent;
use ctxslim_memory::Decision;

/// The ephemeral bundle assembled for one change request.
///
/// Rendered to text, handed to an external injector, and discarded; nothing
/// in it is persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextPackage {
    /// Relative path → file content, verbatim or compressed.
    pub files: BTreeMap<String, String>,
    pub decisions: Vec<Decision>,
    pub module_summaries: BTreeMap<String, String>,
    pub total_tokens: u64,
    pub intent: ChangeIntent,
}

impl ContextPackage {
    /// Serialize the package to a single text blob: module summaries, then
    /// file contents fenced with their paths, then decision bullets. Empty
    /// sections are omitted.
    #[must_use]
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if !self.module_summaries.is_empty() {
            parts.push("## Relevant Modules".to_string());
            for (module, summary) in &self.module_summaries {
                parts.push(format!("### {module}\n{summary}"));
            }
        }

        if !self.files.is_empty() {
            parts.push("## Relevant Files".to_string());
            for (path, content) in &self.files {
                parts.push(format!("### {path}\n```\n{content}\n```"));
            }
        }

        if !self.decisions.is_empty() {
            parts.push("## Relevant Decisions".to_string());
            for decision in &self.decisions {
                parts.push(format!("- {} ({})", decision.decision, decision.reason));
            }
        }

        parts.join("\n\n")
    }
}
