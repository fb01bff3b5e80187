//! Application state shared across all route handlers.
//!
//! AppState holds references to all services and shared resources.
//! It is passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use promptos_action::DispatchEngine;
use promptos_core::config::PromptosConfig;
use promptos_storage::PromptLog;

use crate::speech::{LogSpeaker, Speaker};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<PromptosConfig>,
    /// Classifier plus action registry.
    pub engine: Arc<DispatchEngine>,
    /// Prompt log; `None` when storage is disabled.
    pub prompt_log: Option<Arc<PromptLog>>,
    /// Speech output for results flagged with `speak`.
    pub speaker: Arc<dyn Speaker>,
    /// Upper bound on processing one prompt.
    pub request_timeout: Duration,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState without a prompt log, speaking to the log.
    pub fn new(config: PromptosConfig, engine: DispatchEngine) -> Self {
        let request_timeout = Duration::from_secs(config.general.request_timeout_secs.max(1));
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            prompt_log: None,
            speaker: Arc::new(LogSpeaker),
            request_timeout,
            start_time: Instant::now(),
        }
    }

    pub fn with_prompt_log(mut self, prompt_log: Arc<PromptLog>) -> Self {
        self.prompt_log = Some(prompt_log);
        self
    }

    pub fn with_speaker(mut self, speaker: Arc<dyn Speaker>) -> Self {
        self.speaker = speaker;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
