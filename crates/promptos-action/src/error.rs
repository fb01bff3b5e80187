//! Error types for the dispatch pipeline.

/// Errors raised inside an action's `run`.
///
/// These never escape the dispatch engine: it turns them into a failed
/// `CommandResult` whose message is this error's display text.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Action failed: {0}")]
    Failed(String),
    #[error("Command `{command}` exited with status {code}: {detail}")]
    CommandFailed {
        command: String,
        code: i32,
        detail: String,
    },
    #[error("Archive error: {0}")]
    Archive(String),
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Action already registered: {0}")]
    DuplicateName(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<walkdir::Error> for ActionError {
    fn from(err: walkdir::Error) -> Self {
        ActionError::Io(err.into())
    }
}

impl From<zip::result::ZipError> for ActionError {
    fn from(err: zip::result::ZipError) -> Self {
        ActionError::Archive(err.to_string())
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(err: reqwest::Error) -> Self {
        ActionError::Upload(err.to_string())
    }
}

/// Errors from the intent classifier.
///
/// The dispatch engine does not catch these; they reach the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    #[error("API key not set: environment variable {0} is missing")]
    MissingApiKey(String),
    #[error("Intent service request failed: {0}")]
    Transport(String),
    #[error("Intent service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Intent service response could not be decoded: {0}")]
    Decode(String),
    #[error("Intent service returned no completion")]
    EmptyResponse,
}
