use ctxslim_indexer::IndexDigest;

use crate::backend::{AiBackend, CompletionRequest};
use crate::error::{IntentError, Result};
use crate::intent::ChangeIntent;
use crate::stage::{StageConfig, STAGE_CHANGE_ANALYSIS};

const SYSTEM_PROMPT: &str = "You are analyzing a code change request. \
Identify which modules and files are affected. \
Respond ONLY with valid JSON.";

const INTENT_SCHEMA: &str = r#"{
  "change_type": "feature | bugfix | refactor | config | style",
  "affected_modules": ["auth", "api"],
  "affected_files": ["src/auth/login.py", "src/api/users.py"],
  "needs_new_files": true,
  "new_files_needed": ["src/auth/forgot_password.py"],
  "context_needed": ["auth module summary", "user model"],
  "estimated_complexity": "trivial | simple | moderate | complex",
  "token_estimate": 450
}"#;

/// Turns a free-text change description plus an index digest into a
/// structured [`ChangeIntent`].
pub struct ChangeClassifier {
    backend: Box<dyn AiBackend>,
    stages: StageConfig,
}

impl ChangeClassifier {
    #[must_use]
    pub fn new(backend: Box<dyn AiBackend>, stages: StageConfig) -> Self {
        Self { backend, stages }
    }

    /// Classify a change request.
    ///
    /// On an unparsable response, retries exactly once with a stricter
    /// instruction reiterating the required shape; a second failure is
    /// terminal for this change cycle.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError::Classification`] after the bounded retry, or a
    /// transport error from the backend.
    pub async fn classify(
        &self,
        description: &str,
        digest: &IndexDigest,
    ) -> Result<ChangeIntent> {
        let settings = self
            .stages
            .get(STAGE_CHANGE_ANALYSIS)
            .ok_or_else(|| IntentError::UnknownStage(STAGE_CHANGE_ANALYSIS.to_string()))?;
        let digest_json = serde_json::to_string_pretty(digest)
            .map_err(|e| IntentError::Classification(e.to_string()))?;

        let first = format!(
            "Change request: {description}\n\n\
             Available project structure:\n{digest_json}\n\n\
             Respond ONLY with JSON matching this schema:\n{INTENT_SCHEMA}"
        );
        let stricter = format!(
            "Change request: {description}\n\n\
             Available project structure:\n{digest_json}\n\n\
             CRITICAL: Valid JSON only, no markdown.\n\n\
             Schema:\n{INTENT_SCHEMA}"
        );

        for (attempt, user) in [first, stricter].into_iter().enumerate() {
            let request = CompletionRequest {
                model: settings.model.clone(),
                system: SYSTEM_PROMPT.to_string(),
                user,
                max_tokens: settings.max_tokens,
                temperature: settings.temperature,
            };
            let raw = self.backend.complete(&request).await?;
            match parse_intent(&raw) {
                Ok(intent) => return Ok(intent),
                Err(e) => log::warn!(
                    "{} returned unparsable intent on attempt {}: {e}",
                    self.backend.name(),
                    attempt + 1
                ),
            }
        }

        Err(IntentError::Classification(
            "response did not parse as intent JSON after retry".to_string(),
        ))
    }
}

/// Parse raw backend output, tolerating a Markdown code fence around the
/// JSON body.
fn parse_intent(raw: &str) -> serde_json::Result<ChangeIntent> {
    serde_json::from_str(strip_fence(raw))
}

fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
