//! Action trait and the registry that maps intent labels to actions.
//!
//! Each action is a nullary operation: everything it needs comes from the
//! configuration it was built with. The registry is filled once at startup
//! and shared read-only afterwards.

pub mod generate_architecture;
pub mod push_zip;
pub mod sync_env;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use promptos_core::config::ActionsConfig;
use promptos_core::types::CommandResult;

use crate::error::ActionError;

pub use generate_architecture::GenerateArchitectureAction;
pub use push_zip::PushZipAction;
pub use sync_env::SyncEnvAction;

/// Canonical form of a file an action writes into the tree it walks.
///
/// `None` until the file exists, in which case no walked entry can be it.
pub(crate) fn output_marker(output: &Path) -> Option<PathBuf> {
    output.canonicalize().ok()
}

/// True when `path` is the file `marker` was taken from, however either
/// path was spelled (relative, absolute, through a symlink).
pub(crate) fn is_output(path: &Path, marker: Option<&Path>) -> bool {
    match marker {
        Some(marker) => path.file_name() == marker.file_name()
            && path.canonicalize().ok().as_deref() == Some(marker),
        None => false,
    }
}

/// A named unit of work the router can dispatch to.
#[async_trait]
pub trait Action: Send + Sync {
    /// Intent label this action answers to.
    fn name(&self) -> &'static str;

    /// Execute the action.
    ///
    /// `Ok` carries the result handed back to the caller unchanged, which
    /// may itself report `success = false`. `Err` is converted into a failed
    /// result by the dispatch engine.
    async fn run(&self) -> Result<CommandResult, ActionError>;

    /// Short human-readable description, used in logs and `/health`.
    fn describe(&self) -> String;
}

/// Mapping from intent label to action.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<&'static str, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding `sync_env`, `push_zip` and
    /// `generate_architecture`, configured from `config`.
    pub fn with_defaults(config: &ActionsConfig) -> Self {
        let mut registry = Self::new();
        let defaults: [Arc<dyn Action>; 3] = [
            Arc::new(SyncEnvAction::new(config.sync_env.clone())),
            Arc::new(PushZipAction::new(config.push_zip.clone())),
            Arc::new(GenerateArchitectureAction::new(
                config.generate_architecture.clone(),
            )),
        ];
        for action in defaults {
            let name = action.name();
            registry.actions.insert(name, action);
        }
        registry
    }

    /// Register an action under its own name. Names must be unique.
    pub fn register(&mut self, action: Arc<dyn Action>) -> Result<(), ActionError> {
        let name = action.name();
        if self.actions.contains_key(name) {
            return Err(ActionError::DuplicateName(name.to_string()));
        }
        tracing::debug!(action = name, "Action registered");
        self.actions.insert(name, action);
        Ok(())
    }

    /// Exact-match lookup. Unknown labels are `None`, not an error.
    pub fn resolve(&self, intent: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(intent).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.actions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
