//! Intent-to-action dispatch for PromptOS.
//!
//! Classifies free-text prompts with a language model, routes the intent to
//! one of a fixed set of named actions and formats the outcome.

pub mod action;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod intent;

pub use action::{Action, ActionRegistry};
pub use engine::DispatchEngine;
pub use error::{ActionError, IntentError};
pub use feedback::present;
pub use intent::{IntentClassifier, LlmIntentClassifier};
