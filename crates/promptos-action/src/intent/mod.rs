//! Intent classification.
//!
//! Turns a free-text prompt into a normalized intent label using an
//! external language model.

pub mod llm;

use async_trait::async_trait;
use promptos_core::types::Intent;

use crate::error::IntentError;

pub use llm::{ApiFormat, LlmIntentClassifier};

/// Anything that can label a prompt with an intent.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classify `prompt`. Transport and service failures are returned as
    /// errors, never replaced by a guessed label.
    async fn classify(&self, prompt: &str) -> Result<Intent, IntentError>;
}
