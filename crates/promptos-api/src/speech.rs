//! Speech output for results flagged with `speak`.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use promptos_core::config::SpeechConfig;
use promptos_core::error::PromptosError;

/// Anything that can say a sentence out loud.
#[async_trait]
pub trait Speaker: Send + Sync {
    async fn speak(&self, text: &str) -> Result<(), PromptosError>;
}

/// Speaks by running an external program (e.g. `espeak`, `say`) with the
/// text as its only argument.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: String,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Speaker for CommandSpeaker {
    async fn speak(&self, text: &str) -> Result<(), PromptosError> {
        let status = Command::new(&self.program)
            .arg(text)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| PromptosError::Speech(format!("Failed to run {}: {}", self.program, e)))?;

        if !status.success() {
            return Err(PromptosError::Speech(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }
}

/// Writes the utterance to the log instead of the speakers.
#[derive(Debug, Clone, Default)]
pub struct LogSpeaker;

#[async_trait]
impl Speaker for LogSpeaker {
    async fn speak(&self, text: &str) -> Result<(), PromptosError> {
        tracing::info!(utterance = %text, "Speak");
        Ok(())
    }
}

/// Pick the speaker for the given configuration.
pub fn from_config(config: &SpeechConfig) -> Arc<dyn Speaker> {
    match config.command.as_deref().map(str::trim) {
        Some(program) if config.enabled && !program.is_empty() => {
            Arc::new(CommandSpeaker::new(program))
        }
        _ => Arc::new(LogSpeaker),
    }
}
