use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const STAGE_CHANGE_ANALYSIS: &str = "change_analysis";
pub const STAGE_GENERATE: &str = "generate";

/// Which external reasoning service to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Anthropic,
    Gemini,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anthropic => write!(f, "claude"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(format!("unknown backend '{other}', use 'claude' or 'gemini'")),
        }
    }
}

/// Model, output cap, and temperature for one pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Stage → settings mapping, constructed once per run and passed by
/// reference into the classifier; never global mutable state.
#[derive(Debug, Clone, Default)]
pub struct StageConfig {
    stages: BTreeMap<String, StageSettings>,
}

impl StageConfig {
    /// Default stage table for a backend: the cheap model classifies, the
    /// strong model generates.
    #[must_use]
    pub fn for_backend(kind: BackendKind) -> Self {
        let (cheap, strong) = match kind {
            BackendKind::Anthropic => ("claude-haiku-4-5", "claude-sonnet-4-5"),
            BackendKind::Gemini => ("gemini-1.5-flash", "gemini-1.5-pro"),
        };
        let mut stages = BTreeMap::new();
        stages.insert(
            STAGE_CHANGE_ANALYSIS.to_string(),
            StageSettings {
                model: cheap.to_string(),
                max_tokens: 512,
                temperature: 0.0,
            },
        );
        stages.insert(
            STAGE_GENERATE.to_string(),
            StageSettings {
                model: strong.to_string(),
                max_tokens: 8192,
                temperature: 0.0,
            },
        );
        Self { stages }
    }

    #[must_use]
    pub fn get(&self, stage: &str) -> Option<&StageSettings> {
        self.stages.get(stage)
    }

    pub fn set(&mut self, stage: impl Into<String>, settings: StageSettings) {
        self.stages.insert(stage.into(), settings);
    }
}
