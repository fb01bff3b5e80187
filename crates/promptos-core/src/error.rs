use thiserror::Error;

/// Top-level error type for PromptOS.
///
/// Subsystem crates define their own error types where they need finer
/// detail (`ActionError`, `IntentError`, `ApiError`) and fall back to this
/// one for configuration, storage and speech failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PromptosError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for PromptosError {
    fn from(err: toml::de::Error) -> Self {
        PromptosError::Config(err.to_string())
    }
}

/// A specialized `Result` type for PromptOS operations.
pub type Result<T> = std::result::Result<T, PromptosError>;
