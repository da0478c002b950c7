use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::backend::{retry, AiBackend, CompletionRequest};
use crate::error::{IntentError, Result};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Google Gemini generateContent backend.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
}

impl GeminiBackend {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Build a backend from `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError::MissingApiKey`] when the variable is unset.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var(API_KEY_VAR).map_err(|_| IntentError::MissingApiKey(API_KEY_VAR))?;
        Ok(Self::new(api_key))
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{API_BASE}/{model}:generateContent")
    }
}

fn request_body(request: &CompletionRequest) -> Value {
    json!({
        "system_instruction": {"parts": [{"text": request.system}]},
        "contents": [{"role": "user", "parts": [{"text": request.user}]}],
        "generationConfig": {
            "maxOutputTokens": request.max_tokens,
            "temperature": request.temperature,
            "responseMimeType": "application/json",
        },
    })
}

fn response_text(body: &Value) -> Result<String> {
    body.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|candidate| candidate.pointer("/content/parts/0/text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| IntentError::Backend("gemini response had no text part".to_string()))
}

#[async_trait]
impl AiBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = request_body(request);
        let url = self.endpoint(&request.model);

        for attempt in 1..=retry::MAX_ATTEMPTS {
            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let wait = retry::backoff(attempt);
                log::warn!(
                    "gemini rate limited (attempt {attempt}/{}), waiting {}s",
                    retry::MAX_ATTEMPTS,
                    wait.as_secs()
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if !response.status().is_success() {
                let status = response.status();
                let detail = response.text().await.unwrap_or_default();
                return Err(IntentError::Backend(format!(
                    "gemini returned {status}: {detail}"
                )));
            }

            let parsed: Value = response.json().await?;
            return response_text(&parsed);
        }

        Err(IntentError::Backend(
            "gemini rate limit persisted past retry budget".to_string(),
        ))
    }
}
