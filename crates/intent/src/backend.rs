use async_trait::async_trait;

use crate::anthropic::AnthropicBackend;
use crate::error::Result;
use crate::gemini::GeminiBackend;
use crate::stage::BackendKind;

/// One completion request to an external reasoning service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Capability interface over the external AI services.
///
/// Calls are synchronous from the core's point of view and may take
/// arbitrarily long; rate limiting is absorbed inside the implementations
/// with a bounded backoff loop.
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &'static str;

    /// Send one completion request and return the raw response text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Construct the configured backend.
///
/// # Errors
///
/// Returns [`crate::IntentError::MissingApiKey`] when the backend's key is
/// not present in the environment.
pub fn backend_for(kind: BackendKind) -> Result<Box<dyn AiBackend>> {
    Ok(match kind {
        BackendKind::Anthropic => Box::new(AnthropicBackend::from_env()?),
        BackendKind::Gemini => Box::new(GeminiBackend::from_env()?),
    })
}

/// Shared bounded retry policy for HTTP 429 responses.
///
/// An explicit loop, not recursion: repeated rate limiting must not grow the
/// stack. Waits are linear in the attempt number.
pub(crate) mod retry {
    use std::time::Duration;

    pub(crate) const MAX_ATTEMPTS: u32 = 4;

    pub(crate) fn backoff(attempt: u32) -> Duration {
        Duration::from_secs(u64::from(attempt) * 15)
    }
}
