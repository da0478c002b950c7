use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::backend::{retry, AiBackend, CompletionRequest};
use crate::error::{IntentError, Result};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Anthropic messages API backend.
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_key: String,
}

impl AnthropicBackend {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Build a backend from `ANTHROPIC_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`IntentError::MissingApiKey`] when the variable is unset.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var(API_KEY_VAR).map_err(|_| IntentError::MissingApiKey(API_KEY_VAR))?;
        Ok(Self::new(api_key))
    }
}

fn request_body(request: &CompletionRequest) -> Value {
    json!({
        "model": request.model,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "system": [{
            "type": "text",
            "text": request.system,
            "cache_control": {"type": "ephemeral"},
        }],
        "messages": [{"role": "user", "content": request.user}],
    })
}

fn response_text(body: &Value) -> Result<String> {
    body.get("content")
        .and_then(|c| c.get(0))
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| IntentError::Backend("anthropic response had no text content".to_string()))
}

#[async_trait]
impl AiBackend for AnthropicBackend {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = request_body(request);

        for attempt in 1..=retry::MAX_ATTEMPTS {
            let response = self
                .client
                .post(API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .json(&body)
                .send()
                .await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let wait = retry::backoff(attempt);
                log::warn!(
                    "anthropic rate limited (attempt {attempt}/{}), waiting {}s",
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
                    "anthropic returned {status}: {detail}"
                )));
            }

            let parsed: Value = response.json().await?;
            return response_text(&parsed);
        }

        Err(IntentError::Backend(
            "anthropic rate limit persisted past retry budget".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_request() -> CompletionRequest {
        CompletionRequest {
            model: "claude-haiku-4-5".to_string(),
            system: "classify".to_string(),
            user: "change request".to_string(),
            max_tokens: 512,
            temperature: 0.0,
        }
    }

    #[test]
    fn body_carries_cached_system_prompt() {
        let body = request_body(&sample_request());
        assert_eq!(body["model"], "claude-haiku-4-5");
        assert_eq!(body["system"][0]["text"], "classify");
        assert_eq!(body["system"][0]["cache_control"]["type"], "ephemeral");
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn extracts_first_text_block() {
        let body = json!({"content": [{"type": "text", "text": "{\"ok\": true}"}]});
        assert_eq!(response_text(&body).unwrap(), "{\"ok\": true}");
    }

    #[test]
    fn missing_text_is_a_backend_error() {
        let body = json!({"content": []});
        assert!(response_text(&body).is_err());
    }
}
