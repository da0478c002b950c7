use thiserror::Error;

pub type Result<T> = std::result::Result<T, IntentError>;

#[derive(Error, Debug)]
pub enum IntentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Missing API key: set {0}")]
    MissingApiKey(&'static str),

    #[error("No stage configuration for stage '{0}'")]
    UnknownStage(String),

    #[error("Classification failed: {0}")]
    Classification(String),
}
