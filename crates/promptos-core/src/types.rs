use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Command result
// =============================================================================

/// The outcome of processing one prompt.
///
/// Every terminal path through the dispatch engine produces exactly one of
/// these: a known action's own result, an action failure, or the apology
/// for an intent nobody handles. `message` is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    /// True iff the selected action completed without error.
    pub success: bool,
    /// Human-readable outcome or failure reason.
    pub message: String,
    /// Whether the caller should hand `message` to the speech collaborator.
    #[serde(default, skip_serializing_if = "is_false")]
    pub speak: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl CommandResult {
    /// A successful result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            speak: false,
        }
    }

    /// A failed result with the given message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            speak: false,
        }
    }

    /// Set the speak flag.
    pub fn with_speak(mut self, speak: bool) -> Self {
        self.speak = speak;
        self
    }
}

// =============================================================================
// Intent
// =============================================================================

/// A normalized intent label: trimmed and lowercased.
///
/// The label is free text produced by a language model, so nothing
/// guarantees it names a registered action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intent(String);

impl Intent {
    /// Normalize raw model output into an intent label.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Presentation
// =============================================================================

/// Status text shown for a successful command.
pub const STATUS_DONE: &str = "✅ Feito";
/// Status text shown for a failed command.
pub const STATUS_FAILED: &str = "⚠️ Falhou";

/// User-facing rendering of a [`CommandResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    pub status: String,
    pub message: String,
}
