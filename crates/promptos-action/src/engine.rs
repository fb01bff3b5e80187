//! Dispatch engine.
//!
//! Classifies a prompt, resolves the intent against the action registry and
//! runs the matching action. Every prompt yields exactly one
//! `CommandResult`; only classifier failures escape as errors.

use std::sync::Arc;

use promptos_core::types::CommandResult;

use crate::action::ActionRegistry;
use crate::error::IntentError;
use crate::intent::IntentClassifier;

/// Apology returned when no action answers to the classified intent.
pub fn unknown_intent_message(prompt: &str) -> String {
    format!("Desculpa, não entendi como executar: '{}'", prompt)
}

/// Phases a prompt moves through. Logged, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    Classifying,
    Dispatching,
    Done,
}

pub struct DispatchEngine {
    classifier: Arc<dyn IntentClassifier>,
    registry: ActionRegistry,
}

impl DispatchEngine {
    /// Build an engine. The registry is frozen from here on.
    pub fn new(classifier: Arc<dyn IntentClassifier>, registry: ActionRegistry) -> Self {
        Self {
            classifier,
            registry,
        }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Process one prompt.
    ///
    /// Known intents return the action's own result unchanged. An action
    /// error becomes `success = false` with the error text as message.
    /// Unknown intents return the apology. Classifier errors propagate.
    pub async fn process(&self, prompt: &str) -> Result<CommandResult, IntentError> {
        tracing::debug!(phase = ?DispatchPhase::Classifying, "Processing prompt");
        let intent = self.classifier.classify(prompt).await?;

        tracing::debug!(phase = ?DispatchPhase::Dispatching, intent = %intent, "Intent resolved");
        let result = match self.registry.resolve(intent.as_str()) {
            Some(action) => match action.run().await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(action = action.name(), error = %e, "Action failed");
                    CommandResult::failure(e.to_string())
                }
            },
            None => {
                tracing::info!(intent = %intent, "No action registered for intent");
                CommandResult::failure(unknown_intent_message(prompt))
            }
        };

        tracing::debug!(
            phase = ?DispatchPhase::Done,
            success = result.success,
            "Prompt processed"
        );
        Ok(result)
    }
}
