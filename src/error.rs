use serde::Serialize;
use thiserror::Error;

/// Failure of a single generation call, already classified.
///
/// Every variant is terminal for the submission that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Authentication error: {0}")]
    Authentication(String),
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("Content policy error: {0}")]
    ContentPolicy(String),
    #[error("Missing image data in an otherwise successful response")]
    MissingImageData,
    #[error("Unknown error: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    RateLimited,
    ContentPolicy,
    MissingImageData,
    Unknown,
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Authentication(_) => ErrorKind::Authentication,
            GenerationError::RateLimited(_) => ErrorKind::RateLimited,
            GenerationError::ContentPolicy(_) => ErrorKind::ContentPolicy,
            GenerationError::MissingImageData => ErrorKind::MissingImageData,
            GenerationError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Message shown in the form area when a submission fails.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Authentication(_) => {
                "🔐 Invalid API key. The image service rejected the configured credential; \
                 check the key for the selected backend."
                    .to_string()
            }
            GenerationError::RateLimited(_) => {
                "⏳ Limit reached. The image service quota or request rate is exhausted; \
                 wait a moment or add more credit."
                    .to_string()
            }
            GenerationError::ContentPolicy(_) => {
                "🚫 The spirits refused this vision. The prompt was rejected by the \
                 service's content policy."
                    .to_string()
            }
            GenerationError::MissingImageData => {
                "🌫️ The ritual finished but no image came back from the void.".to_string()
            }
            GenerationError::Unknown(detail) if detail.is_empty() => {
                "The ritual failed. The spirits are silent.".to_string()
            }
            GenerationError::Unknown(detail) => format!("The spell failed! 🌙 {}", detail),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("Download error: {0}")]
    Download(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
