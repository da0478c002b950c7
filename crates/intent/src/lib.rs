//! Change-intent classification boundary.
//!
//! The core defines the request/response contract and the retry policy; the
//! actual reasoning is done by an external service behind the [`AiBackend`]
//! capability trait, with interchangeable Anthropic and Gemini
//! implementations selected by configuration.

mod anthropic;
mod backend;
mod classifier;
mod error;
mod gemini;
mod intent;
mod stage;

pub use anthropic::AnthropicBackend;
pub use backend::{backend_for, AiBackend, CompletionRequest};
pub use classifier::ChangeClassifier;
pub use error::{IntentError, Result};
pub use gemini::GeminiBackend;
pub use intent::{ChangeIntent, ChangeKind, Complexity};
pub use stage::{BackendKind, StageConfig, StageSettings, STAGE_CHANGE_ANALYSIS, STAGE_GENERATE};
