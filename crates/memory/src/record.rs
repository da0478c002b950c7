use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Technology-stack description; every choice may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackInfo {
    #[serde(default)]
    pub language: String,
    pub frontend: Option<String>,
    pub backend: Option<String>,
    pub database: Option<String>,
    pub auth: Option<String>,
    pub hosting: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

/// An explicitly registered module; never derived from the index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleEntry {
    pub status: ModuleStatus,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// An architectural decision. Append-only; never edited or removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Decision {
    pub decision: String,
    pub reason: String,
    /// Unix milliseconds when recorded.
    pub date: u64,
    #[serde(default)]
    pub affects: Vec<String>,
}

/// One completed change cycle. Append-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Unix milliseconds when recorded.
    pub date: u64,
    pub description: String,
    #[serde(default)]
    pub files_changed: Vec<String>,
    pub tokens_used: u64,
    pub tokens_saved: u64,
}

/// The single per-project memory record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryRecord {
    pub project_name: String,
    /// Unix milliseconds.
    pub created_at: u64,
    /// Unix milliseconds; stamped on every save.
    pub last_updated: u64,
    #[serde(default)]
    pub stack: StackInfo,
    #[serde(default = "default_ai_target")]
    pub ai_target: String,
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleEntry>,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub change_history: Vec<ChangeEvent>,
}

fn default_ai_target() -> String {
    "both".to_string()
}

impl MemoryRecord {
    /// A blank record for a project that has no memory yet.
    #[must_use]
    pub fn new(project_name: impl Into<String>, now_ms: u64) -> Self {
        Self {
            project_name: project_name.into(),
            created_at: now_ms,
            last_updated: now_ms,
            stack: StackInfo::default(),
            ai_target: default_ai_target(),
            modules: BTreeMap::new(),
            decisions: Vec::new(),
            change_history: Vec::new(),
        }
    }

    #[must_use]
    pub fn get_module(&self, name: &str) -> Option<&ModuleEntry> {
        self.modules.get(name)
    }

    pub fn get_module_mut(&mut self, name: &str) -> Option<&mut ModuleEntry> {
        self.modules.get_mut(name)
    }

    /// Names of registered modules whose file membership intersects `paths`.
    #[must_use]
    pub fn modules_for_files(&self, paths: &[String]) -> Vec<String> {
        self.modules
            .iter()
            .filter(|(_, entry)| entry.files.iter().any(|f| paths.contains(f)))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Decisions whose affected-module list intersects `module_names`.
    #[must_use]
    pub fn decisions_for_modules(&self, module_names: &[String]) -> Vec<Decision> {
        self.decisions
            .iter()
            .filter(|d| d.affects.iter().any(|m| module_names.contains(m)))
            .cloned()
            .collect()
    }

    /// Add or replace a module entry.
    pub fn set_module(&mut self, name: impl Into<String>, entry: ModuleEntry) {
        self.modules.insert(name.into(), entry);
    }

    pub fn add_decision(
        &mut self,
        decision: impl Into<String>,
        reason: impl Into<String>,
        affects: Vec<String>,
        now_ms: u64,
    ) {
        self.decisions.push(Decision {
            decision: decision.into(),
            reason: reason.into(),
            date: now_ms,
            affects,
        });
    }

    pub fn add_change(
        &mut self,
        description: impl Into<String>,
        files_changed: Vec<String>,
        tokens_used: u64,
        tokens_saved: u64,
        now_ms: u64,
    ) {
        self.change_history.push(ChangeEvent {
            date: now_ms,
            description: description.into(),
            files_changed,
            tokens_used,
            tokens_saved,
        });
    }
}
