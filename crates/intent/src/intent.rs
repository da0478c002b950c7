use serde::{Deserialize, Deserializer, Serialize};

/// Category of a requested change.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    #[default]
    Feature,
    Bugfix,
    Refactor,
    Config,
    Style,
}

impl<'de> Deserialize<'de> for ChangeKind {
    // Tolerate anything the external service sends back; unrecognized
    // categories fall back to the default rather than failing the cycle.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.to_lowercase().as_str() {
            "bugfix" | "fix" => Self::Bugfix,
            "refactor" => Self::Refactor,
            "config" => Self::Config,
            "style" => Self::Style,
            _ => Self::Feature,
        })
    }
}

/// Rough effort estimate attached to a classified change.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Trivial,
    #[default]
    Simple,
    Moderate,
    Complex,
}

impl<'de> Deserialize<'de> for Complexity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.to_lowercase().as_str() {
            "trivial" => Self::Trivial,
            "moderate" => Self::Moderate,
            "complex" => Self::Complex,
            _ => Self::Simple,
        })
    }
}

/// Structured interpretation of a free-text change request.
///
/// Ephemeral: produced once per change request and consumed immediately by
/// the context selector, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeIntent {
    #[serde(default)]
    pub change_type: ChangeKind,
    #[serde(default)]
    pub affected_modules: Vec<String>,
    #[serde(default)]
    pub affected_files: Vec<String>,
    #[serde(default)]
    pub needs_new_files: bool,
    #[serde(default)]
    pub new_files_needed: Vec<String>,
    #[serde(default)]
    pub context_needed: Vec<String>,
    #[serde(default)]
    pub estimated_complexity: Complexity,
    #[serde(default)]
    pub token_estimate: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_a_complete_response() {
        let raw = r#"{
            "change_type": "bugfix",
            "affected_modules": ["auth"],
            "affected_files": ["src/auth/login.py"],
            "needs_new_files": false,
            "new_files_needed": [],
            "context_needed": ["auth module summary"],
            "estimated_complexity": "moderate",
            "token_estimate": 450
        }"#;
        let intent: ChangeIntent = serde_json::from_str(raw).unwrap();
        assert_eq!(intent.change_type, ChangeKind::Bugfix);
        assert_eq!(intent.estimated_complexity, Complexity::Moderate);
        assert_eq!(intent.affected_modules, vec!["auth"]);
        assert_eq!(intent.token_estimate, 450);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let intent: ChangeIntent = serde_json::from_str("{}").unwrap();
        assert_eq!(intent.change_type, ChangeKind::Feature);
        assert_eq!(intent.estimated_complexity, Complexity::Simple);
        assert!(intent.affected_files.is_empty());
        assert!(!intent.needs_new_files);
    }

    #[test]
    fn unknown_enum_strings_fall_back() {
        let raw = r#"{"change_type": "mystery", "estimated_complexity": "herculean"}"#;
        let intent: ChangeIntent = serde_json::from_str(raw).unwrap();
        assert_eq!(intent.change_type, ChangeKind::Feature);
        assert_eq!(intent.estimated_complexity, Complexity::Simple);
    }
}
